use self::{FormatterError::*, ParseErrorKind::*};
use std::{error, fmt};

/// An error resulting from building a [`DateFormatter`](super::DateFormatter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatterError {
    /// Invalid locale identifier.
    InvalidLocale(String),
    /// Invalid time zone identifier.
    InvalidTimeZone(String),
    /// Invalid pattern.
    InvalidPattern(String),
    /// Invalid format style.
    InvalidStyle(String),
    /// Invalid calendar.
    InvalidCalendar(String),
}

impl fmt::Display for FormatterError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InvalidLocale(locale) => write!(f, "invalid locale string given: `{locale}`"),
            InvalidTimeZone(timezone) => write!(f, "invalid time zone given: `{timezone}`"),
            InvalidPattern(reason) => write!(f, "invalid pattern given: {reason}"),
            InvalidStyle(style) => write!(f, "invalid format style given: `{style}`"),
            InvalidCalendar(calendar) => write!(f, "invalid calendar given: `{calendar}`"),
        }
    }
}

impl error::Error for FormatterError {}

/// The kind of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Literal text of the pattern does not match.
    Literal,
    /// Digits are missing or malformed.
    Digits,
    /// A month, weekday, era or day period name is not recognized.
    Name,
    /// A field value is out of range.
    OutOfRange,
    /// The weekday disagrees with the date.
    WeekdayMismatch,
    /// A UTC offset is malformed.
    Offset,
    /// A time zone identifier is not recognized.
    TimeZone,
    /// The local time does not exist in the time zone.
    NonexistentLocalTime,
    /// Characters remain after the parsed value.
    TrailingInput,
}

impl ParseErrorKind {
    /// Returns a short description of the error kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Literal => "unexpected literal text",
            Digits => "invalid digits",
            Name => "unrecognized name",
            OutOfRange => "field value out of range",
            WeekdayMismatch => "weekday does not match the date",
            Offset => "invalid UTC offset",
            TimeZone => "unrecognized time zone",
            NonexistentLocalTime => "nonexistent local time",
            TrailingInput => "trailing input",
        }
    }
}

/// An error resulting from parsing a date time string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseError {
    /// Error kind.
    kind: ParseErrorKind,
    /// Byte offset at which parsing failed.
    position: usize,
}

impl ParseError {
    /// Creates a new instance.
    #[inline]
    pub(crate) fn new(kind: ParseErrorKind, position: usize) -> Self {
        Self { kind, position }
    }

    /// Returns the error kind.
    #[inline]
    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    /// Returns the byte offset at which parsing failed.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at position {}", self.kind.as_str(), self.position)
    }
}

impl error::Error for ParseError {}
