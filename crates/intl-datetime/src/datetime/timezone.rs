use super::FormatterError;
use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, Offset, TimeZone as _, Utc};
use chrono_tz::Tz;
use std::{fmt, str::FromStr};

/// A time zone identified by an IANA name or a fixed UTC offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeZone {
    /// Canonical identifier.
    id: String,
    /// Zone rules.
    kind: ZoneKind,
}

/// Zone rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ZoneKind {
    /// IANA time zone.
    Named(Tz),
    /// Fixed offset from UTC.
    Fixed(FixedOffset),
}

impl TimeZone {
    /// Returns the UTC time zone.
    #[inline]
    pub fn utc() -> Self {
        Self::from(Utc.fix())
    }

    /// Parses a time zone identifier.
    ///
    /// Accepts IANA names like `Europe/Berlin`, the aliases `UTC`, `GMT`, `Z`,
    /// and offsets like `+08`, `+0800`, `+08:00`, `GMT+8` or `UTC-05:30`.
    pub fn parse(id: &str) -> Result<Self, FormatterError> {
        let id = id.trim();
        if matches!(id, "UTC" | "GMT" | "Z" | "utc" | "gmt") {
            return Ok(Self::utc());
        }
        if let Some(offset) = parse_offset_id(id) {
            return Ok(Self::from(offset));
        }
        id.parse::<Tz>()
            .map(|tz| Self {
                id: tz.name().to_owned(),
                kind: ZoneKind::Named(tz),
            })
            .map_err(|_| FormatterError::InvalidTimeZone(id.to_owned()))
    }

    /// Returns the canonical identifier.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the UTC offset in effect at a UTC date time.
    pub fn offset_at(&self, utc: &NaiveDateTime) -> FixedOffset {
        match self.kind {
            ZoneKind::Named(tz) => tz.offset_from_utc_datetime(utc).fix(),
            ZoneKind::Fixed(offset) => offset,
        }
    }

    /// Converts a UTC date time into this time zone.
    pub fn from_utc(&self, utc: &NaiveDateTime) -> DateTime<FixedOffset> {
        let offset = self.offset_at(utc);
        offset.from_utc_datetime(utc)
    }

    /// Interprets a local date time in this time zone.
    pub fn from_local(&self, local: &NaiveDateTime) -> LocalResult<DateTime<FixedOffset>> {
        match self.kind {
            ZoneKind::Named(tz) => tz
                .from_local_datetime(local)
                .map(|dt| dt.with_timezone(&dt.offset().fix())),
            ZoneKind::Fixed(offset) => offset.from_local_datetime(local),
        }
    }
}

impl Default for TimeZone {
    #[inline]
    fn default() -> Self {
        Self::utc()
    }
}

impl From<FixedOffset> for TimeZone {
    fn from(offset: FixedOffset) -> Self {
        let seconds = offset.local_minus_utc();
        let id = if seconds == 0 {
            "UTC".to_owned()
        } else {
            let sign = if seconds < 0 { '-' } else { '+' };
            let minutes = seconds.abs() / 60;
            format!("{sign}{:02}:{:02}", minutes / 60, minutes % 60)
        };
        Self {
            id,
            kind: ZoneKind::Fixed(offset),
        }
    }
}

impl FromStr for TimeZone {
    type Err = FormatterError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TimeZone {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Parses an offset identifier like `+08:00` or `GMT-5`.
fn parse_offset_id(id: &str) -> Option<FixedOffset> {
    let offset = id
        .strip_prefix("GMT")
        .or_else(|| id.strip_prefix("UTC"))
        .unwrap_or(id);
    let (sign, digits) = match offset.as_bytes().first()? {
        b'+' => (1, &offset[1..]),
        b'-' => (-1, &offset[1..]),
        _ => return None,
    };
    if !digits.bytes().all(|b| b.is_ascii_digit() || b == b':') {
        return None;
    }
    let (hours, minutes) = match digits.split_once(':') {
        Some((hours, minutes)) => (hours, minutes),
        None if digits.len() > 2 => digits.split_at(digits.len() - 2),
        None => (digits, "0"),
    };
    if hours.is_empty() || hours.len() > 2 || minutes.is_empty() || minutes.contains(':') {
        return None;
    }
    let hours = hours.parse::<i32>().ok()?;
    let minutes = minutes.parse::<i32>().ok()?;
    if minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
