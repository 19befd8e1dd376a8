//! Locale-aware date and time formatting and parsing.
//!
//! A [`DateFormatter`] is built from a locale, a pair of [`DateTimeStyle`]s,
//! a [`TimeZone`], a [`CalendarKind`] and an optional LDML pattern.
//! It formats `chrono` date times and parses strings back, either strictly
//! or leniently.

use self::CalendarKind::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

mod error;
mod formatter;
mod locale;
mod parser;
mod pattern;
mod timezone;

pub use error::{FormatterError, ParseError, ParseErrorKind};
pub use formatter::DateFormatter;
pub use locale::LocaleData;
pub use pattern::Pattern;
pub use timezone::TimeZone;

pub(crate) use locale::parse_locale;

/// Predefined date or time format styles.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateTimeStyle {
    /// Omits the date or time part.
    #[default]
    None,
    /// Numeric layout, e.g. `6/3/14` or `3:04 PM`.
    Short,
    /// Abbreviated month names, e.g. `Jun 3, 2014`.
    Medium,
    /// Full month names, e.g. `June 3, 2014`.
    Long,
    /// Fully spelled out, e.g. `Tuesday, June 3, 2014`.
    Full,
}

impl DateTimeStyle {
    /// Returns the style corresponding to an ICU constant.
    pub fn from_icu(value: i64) -> Option<Self> {
        match value {
            -1 => Some(Self::None),
            0 => Some(Self::Full),
            1 => Some(Self::Long),
            2 => Some(Self::Medium),
            3 => Some(Self::Short),
            _ => None,
        }
    }

    /// Returns the ICU constant of the style.
    #[inline]
    pub fn to_icu(self) -> i64 {
        match self {
            Self::None => -1,
            Self::Full => 0,
            Self::Long => 1,
            Self::Medium => 2,
            Self::Short => 3,
        }
    }

    /// Returns `true` if the style omits its part.
    #[inline]
    pub fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns `self` as `&'static str`.
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for DateTimeStyle {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateTimeStyle {
    type Err = FormatterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            "full" => Ok(Self::Full),
            _ => Err(FormatterError::InvalidStyle(s.to_owned())),
        }
    }
}

/// Calendar systems.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarKind {
    /// The proleptic Gregorian calendar.
    #[default]
    Gregorian,
    /// The traditional calendar of the locale.
    Traditional,
}

impl CalendarKind {
    /// Returns the calendar corresponding to an ICU constant.
    pub fn from_icu(value: i64) -> Option<Self> {
        match value {
            0 => Some(Traditional),
            1 => Some(Gregorian),
            _ => None,
        }
    }

    /// Returns the ICU constant of the calendar.
    #[inline]
    pub fn to_icu(self) -> i64 {
        match self {
            Traditional => 0,
            Gregorian => 1,
        }
    }

    /// Returns `self` as `&'static str`.
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Gregorian => "gregorian",
            Traditional => "traditional",
        }
    }
}

impl fmt::Display for CalendarKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalendarKind {
    type Err = FormatterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gregorian" => Ok(Gregorian),
            "traditional" => Ok(Traditional),
            _ => Err(FormatterError::InvalidCalendar(s.to_owned())),
        }
    }
}
