use super::FormatterError;
use std::{fmt, str::FromStr};

/// A date time field of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    /// `G`: era.
    Era,
    /// `y`: year of era.
    Year,
    /// `M` or `L`: month.
    Month,
    /// `d`: day of month.
    Day,
    /// `E`: day of week.
    Weekday,
    /// `a`: AM or PM marker.
    DayPeriod,
    /// `h`: hour in `1..=12`.
    Hour12,
    /// `H`: hour in `0..=23`.
    Hour23,
    /// `k`: hour in `1..=24`.
    Hour24,
    /// `K`: hour in `0..=11`.
    Hour11,
    /// `m`: minute.
    Minute,
    /// `s`: second.
    Second,
    /// `S`: fractional second.
    Fraction,
    /// `z`: localized GMT offset.
    ZoneGmt,
    /// `Z`: RFC 822 offset.
    ZoneRfc,
    /// `X`: ISO 8601 offset with `Z` for UTC.
    ZoneIsoUtc,
    /// `x`: ISO 8601 offset.
    ZoneIso,
    /// `V`: time zone identifier.
    ZoneId,
}

impl Field {
    /// Returns the field for a pattern letter.
    fn from_letter(letter: char) -> Option<Self> {
        let field = match letter {
            'G' => Self::Era,
            'y' => Self::Year,
            'M' | 'L' => Self::Month,
            'd' => Self::Day,
            'E' => Self::Weekday,
            'a' => Self::DayPeriod,
            'h' => Self::Hour12,
            'H' => Self::Hour23,
            'k' => Self::Hour24,
            'K' => Self::Hour11,
            'm' => Self::Minute,
            's' => Self::Second,
            'S' => Self::Fraction,
            'z' => Self::ZoneGmt,
            'Z' => Self::ZoneRfc,
            'X' => Self::ZoneIsoUtc,
            'x' => Self::ZoneIso,
            'V' => Self::ZoneId,
            _ => return None,
        };
        Some(field)
    }

    /// Returns `true` if the field is rendered as digits with the given width.
    pub(crate) fn is_numeric(self, width: usize) -> bool {
        match self {
            Self::Month => width <= 2,
            Self::Year
            | Self::Day
            | Self::Hour12
            | Self::Hour23
            | Self::Hour24
            | Self::Hour11
            | Self::Minute
            | Self::Second
            | Self::Fraction => true,
            _ => false,
        }
    }
}

/// A token of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// Literal text.
    Literal(String),
    /// A field with its repeat count.
    Field(Field, usize),
}

/// A compiled LDML date time pattern such as `EEEE, MMMM d, y`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    /// Source text.
    source: String,
    /// Compiled tokens.
    tokens: Vec<Token>,
}

impl Pattern {
    /// Compiles a pattern.
    pub fn parse(source: &str) -> Result<Self, FormatterError> {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch == '\'' {
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    literal.push('\'');
                    continue;
                }
                let mut terminated = false;
                while let Some(ch) = chars.next() {
                    if ch == '\'' {
                        if chars.peek() == Some(&'\'') {
                            chars.next();
                            literal.push('\'');
                        } else {
                            terminated = true;
                            break;
                        }
                    } else {
                        literal.push(ch);
                    }
                }
                if !terminated {
                    return Err(FormatterError::InvalidPattern(format!(
                        "unterminated quote in `{source}`"
                    )));
                }
            } else if ch.is_ascii_alphabetic() {
                let field = Field::from_letter(ch).ok_or_else(|| {
                    FormatterError::InvalidPattern(format!(
                        "unsupported pattern letter `{ch}` in `{source}`"
                    ))
                })?;
                let mut width = 1;
                while chars.peek() == Some(&ch) {
                    chars.next();
                    width += 1;
                }
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                tokens.push(Token::Field(field, width));
            } else {
                literal.push(ch);
            }
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }
        if tokens.is_empty() {
            return Err(FormatterError::InvalidPattern("empty pattern".to_owned()));
        }
        Ok(Self {
            source: source.to_owned(),
            tokens,
        })
    }

    /// Returns the source text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns `true` if the pattern contains an era field.
    ///
    /// Without an era, years are written and read as signed proleptic years.
    pub fn has_era(&self) -> bool {
        self.tokens
            .iter()
            .any(|token| matches!(token, Token::Field(Field::Era, _)))
    }

    /// Returns the compiled tokens.
    #[inline]
    pub(crate) fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

impl FromStr for Pattern {
    type Err = FormatterError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Pattern {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.source)
    }
}
