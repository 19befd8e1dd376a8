//! Pattern-driven parsing of localized date time strings.

use super::{
    LocaleData, ParseError, ParseErrorKind, Pattern, TimeZone,
    pattern::{Field, Token},
};
use chrono::{
    DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta,
    TimeZone as _, Utc, Weekday,
};

/// Years a two-digit year may lie before the current year.
const TWO_DIGIT_YEAR_LOOKBACK: i32 = 80;

/// Values collected from the input.
#[derive(Debug, Default)]
struct Fields {
    /// `true` if the era is BC.
    bc: bool,
    /// Year, or year of era with an era field, with the number of digits read
    /// and the pattern width.
    year: Option<(i64, usize, usize)>,
    /// Month in `1..=12`.
    month: Option<i64>,
    /// Day of month.
    day: Option<i64>,
    /// Position of the first date field.
    date_position: Option<usize>,
    /// Day of week with its position.
    weekday: Option<(Weekday, usize)>,
    /// `true` for PM.
    pm: Option<bool>,
    /// Hour with the field it came from.
    hour: Option<(Field, i64)>,
    /// Minute.
    minute: Option<i64>,
    /// Second.
    second: Option<i64>,
    /// Nanosecond.
    nanosecond: Option<i64>,
    /// UTC offset in seconds.
    offset: Option<i32>,
    /// Explicit time zone.
    zone: Option<TimeZone>,
}

/// A cursor over the input.
struct Parser<'a> {
    /// Input string.
    input: &'a str,
    /// Current byte offset.
    position: usize,
    /// Locale symbols.
    data: &'static LocaleData,
    /// Lenient mode.
    lenient: bool,
    /// `true` if years may carry a minus sign.
    signed_year: bool,
}

/// Parses `input` from `start` with a compiled pattern.
///
/// Returns the value and the byte offset where parsing stopped.
pub(crate) fn parse(
    pattern: &Pattern,
    data: &'static LocaleData,
    timezone: &TimeZone,
    lenient: bool,
    input: &str,
    start: usize,
) -> Result<(DateTime<FixedOffset>, usize), ParseError> {
    if !input.is_char_boundary(start) {
        return Err(ParseError::new(ParseErrorKind::OutOfRange, start));
    }
    let mut parser = Parser {
        input,
        position: start,
        data,
        lenient,
        signed_year: !pattern.has_era(),
    };
    let mut fields = Fields::default();
    let tokens = pattern.tokens();
    for (index, token) in tokens.iter().enumerate() {
        match token {
            Token::Literal(text) => parser.literal(text)?,
            Token::Field(field, width) => {
                let abutting = matches!(
                    tokens.get(index + 1),
                    Some(Token::Field(next, next_width)) if next.is_numeric(*next_width)
                );
                parser.field(&mut fields, *field, *width, abutting)?;
            }
        }
    }
    let datetime = parser.resolve(fields, timezone)?;
    Ok((datetime, parser.position))
}

impl<'a> Parser<'a> {
    /// Returns the unparsed input.
    #[inline]
    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    /// Returns an error at the current position.
    #[inline]
    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.position)
    }

    /// Consumes literal text.
    fn literal(&mut self, text: &str) -> Result<(), ParseError> {
        if !self.lenient {
            return if self.rest().starts_with(text) {
                self.position += text.len();
                Ok(())
            } else {
                Err(self.error(ParseErrorKind::Literal))
            };
        }

        let mut rest = self.rest();
        for expected in text.chars() {
            if expected.is_whitespace() {
                rest = rest.trim_start();
                continue;
            }
            let mut chars = rest.chars();
            match chars.next() {
                Some(actual) if eq_ignore_case(actual, expected) => rest = chars.as_str(),
                _ => {
                    self.position = self.input.len() - rest.len();
                    return Err(self.error(ParseErrorKind::Literal));
                }
            }
        }
        self.position = self.input.len() - rest.len();
        Ok(())
    }

    /// Consumes between `min` and `max` ASCII digits.
    fn digits(&mut self, min: usize, max: usize) -> Result<(i64, usize), ParseError> {
        let count = self
            .rest()
            .bytes()
            .take(max)
            .take_while(|b| b.is_ascii_digit())
            .count();
        if count == 0 || count < min {
            return Err(self.error(ParseErrorKind::Digits));
        }
        let digits = &self.rest()[..count];
        let value = digits
            .parse::<i64>()
            .map_err(|_| self.error(ParseErrorKind::Digits))?;
        self.position += count;
        Ok((value, count))
    }

    /// Consumes the longest matching name and returns its index.
    fn name(&mut self, candidates: &[&[&'static str]]) -> Result<usize, ParseError> {
        let rest = self.rest();
        let mut best: Option<(usize, usize)> = None;
        for names in candidates {
            for (index, name) in names.iter().enumerate() {
                if let Some(len) = match_prefix(rest, name) {
                    if best.is_none_or(|(_, best_len)| len > best_len) {
                        best = Some((index, len));
                    }
                }
            }
        }
        let (index, len) = best.ok_or_else(|| self.error(ParseErrorKind::Name))?;
        self.position += len;
        Ok(index)
    }

    /// Consumes a sign and returns `1` or `-1`.
    fn sign(&mut self) -> Result<i32, ParseError> {
        let sign = match self.rest().as_bytes().first() {
            Some(b'+') => 1,
            Some(b'-') => -1,
            _ => return Err(self.error(ParseErrorKind::Offset)),
        };
        self.position += 1;
        Ok(sign)
    }

    /// Consumes a localized GMT offset like `GMT`, `GMT+5` or `GMT-05:30`.
    fn gmt_offset(&mut self) -> Result<i32, ParseError> {
        let rest = self.rest();
        let Some(len) = match_prefix(rest, "GMT").or_else(|| match_prefix(rest, "UTC")) else {
            return Err(self.error(ParseErrorKind::Offset));
        };
        self.position += len;
        if !matches!(self.rest().as_bytes().first(), Some(b'+' | b'-')) {
            return Ok(0);
        }
        let sign = self.sign()?;
        let (hours, _) = self.digits(1, 2)?;
        let minutes = if self.rest().starts_with(':') {
            self.position += 1;
            self.digits(2, 2)?.0
        } else {
            0
        };
        self.offset_seconds(sign, hours, minutes)
    }

    /// Consumes an ISO 8601 offset with the layout selected by `width`.
    fn iso_offset(&mut self, width: usize, utc_z: bool) -> Result<i32, ParseError> {
        if utc_z && self.rest().starts_with('Z') {
            self.position += 1;
            return Ok(0);
        }
        let sign = self.sign()?;
        let (hours, _) = self.digits(2, 2)?;
        let has_colon = self.rest().starts_with(':');
        let minutes = match width {
            _ if self.lenient && has_colon => {
                self.position += 1;
                self.digits(2, 2)?.0
            }
            _ if self.lenient => self.digits(2, 2).map(|(minutes, _)| minutes).unwrap_or(0),
            1 => self.digits(2, 2).map(|(minutes, _)| minutes).unwrap_or(0),
            2 => self.digits(2, 2)?.0,
            _ if has_colon => {
                self.position += 1;
                self.digits(2, 2)?.0
            }
            _ => return Err(self.error(ParseErrorKind::Offset)),
        };
        self.offset_seconds(sign, hours, minutes)
    }

    /// Validates an offset and converts it into seconds.
    fn offset_seconds(&self, sign: i32, hours: i64, minutes: i64) -> Result<i32, ParseError> {
        if hours > 23 || minutes > 59 {
            return Err(self.error(ParseErrorKind::Offset));
        }
        let seconds = i32::try_from(hours * 3600 + minutes * 60)
            .map_err(|_| self.error(ParseErrorKind::Offset))?;
        Ok(sign * seconds)
    }

    /// Consumes a time zone identifier like `Europe/Berlin`.
    fn zone_id(&mut self) -> Result<TimeZone, ParseError> {
        let len = self
            .rest()
            .bytes()
            .take_while(|&b| {
                b.is_ascii_alphanumeric() || matches!(b, b'/' | b'_' | b'+' | b'-' | b':')
            })
            .count();
        let id = &self.rest()[..len];
        let timezone = TimeZone::parse(id).map_err(|_| self.error(ParseErrorKind::TimeZone))?;
        self.position += len;
        Ok(timezone)
    }

    /// Consumes a single field.
    fn field(
        &mut self,
        fields: &mut Fields,
        field: Field,
        width: usize,
        abutting: bool,
    ) -> Result<(), ParseError> {
        let position = self.position;
        let data = self.data;
        if field.is_numeric(width) {
            let (min, max) = if abutting {
                (width, width)
            } else {
                match field {
                    Field::Year | Field::Fraction => (1, 9),
                    _ => (1, 2),
                }
            };
            let negative = matches!(field, Field::Year)
                && width != 2
                && self.signed_year
                && self.rest().starts_with('-');
            if negative {
                self.position += 1;
            }
            let (value, count) = self.digits(min, max)?;
            let range = match field {
                Field::Month => 1..=12,
                Field::Day => 1..=31,
                Field::Hour12 => 1..=12,
                Field::Hour23 => 0..=23,
                Field::Hour24 => 1..=24,
                Field::Hour11 => 0..=11,
                Field::Minute | Field::Second => 0..=59,
                _ => 0..=i64::MAX,
            };
            if !self.lenient && !range.contains(&value) {
                return Err(ParseError::new(ParseErrorKind::OutOfRange, position));
            }
            match field {
                Field::Year => {
                    let value = if negative { -value } else { value };
                    fields.year = Some((value, count, width));
                    fields.date_position.get_or_insert(position);
                }
                Field::Month => {
                    fields.month = Some(value);
                    fields.date_position.get_or_insert(position);
                }
                Field::Day => {
                    fields.day = Some(value);
                    fields.date_position.get_or_insert(position);
                }
                Field::Minute => fields.minute = Some(value),
                Field::Second => fields.second = Some(value),
                Field::Fraction => {
                    let count = u32::try_from(count).unwrap_or(u32::MAX);
                    let nanosecond = if count <= 9 {
                        value * 10_i64.pow(9 - count)
                    } else {
                        value / 10_i64.pow(count - 9)
                    };
                    fields.nanosecond = Some(nanosecond);
                }
                _ => fields.hour = Some((field, value)),
            }
            return Ok(());
        }

        match field {
            Field::Month => {
                let (wide, abbr) = (data.months().as_slice(), data.months_abbr().as_slice());
                let index = match (width, self.lenient) {
                    (3, false) => self.name(&[abbr])?,
                    (_, false) => self.name(&[wide])?,
                    _ => self.name(&[wide, abbr])?,
                };
                fields.month = Some(index as i64 + 1);
                fields.date_position.get_or_insert(position);
            }
            Field::Weekday => {
                let (wide, abbr) = (data.weekdays().as_slice(), data.weekdays_abbr().as_slice());
                let index = match (width, self.lenient) {
                    (1..=3, false) => self.name(&[abbr])?,
                    (_, false) => self.name(&[wide])?,
                    _ => self.name(&[wide, abbr])?,
                };
                let weekday = Weekday::try_from(((index + 6) % 7) as u8)
                    .map_err(|_| ParseError::new(ParseErrorKind::Name, position))?;
                fields.weekday = Some((weekday, position));
            }
            Field::Era => fields.bc = self.name(&[data.eras().as_slice()])? == 0,
            Field::DayPeriod => {
                fields.pm = Some(self.name(&[data.day_periods().as_slice()])? == 1);
            }
            Field::ZoneGmt => fields.offset = Some(self.gmt_offset()?),
            Field::ZoneRfc => {
                let offset = match width {
                    1..=3 => self.iso_offset(2, false)?,
                    4 => self.gmt_offset()?,
                    _ => self.iso_offset(3, true)?,
                };
                fields.offset = Some(offset);
            }
            Field::ZoneIsoUtc => fields.offset = Some(self.iso_offset(width, true)?),
            Field::ZoneIso => fields.offset = Some(self.iso_offset(width, false)?),
            Field::ZoneId => fields.zone = Some(self.zone_id()?),
            _ => return Err(self.error(ParseErrorKind::Digits)),
        }
        Ok(())
    }

    /// Combines the collected fields into a date time.
    ///
    /// Missing fields default to `1970-01-01T00:00:00` in the time zone.
    fn resolve(
        &self,
        fields: Fields,
        timezone: &TimeZone,
    ) -> Result<DateTime<FixedOffset>, ParseError> {
        let date_position = fields.date_position.unwrap_or(self.position);
        let out_of_range = || ParseError::new(ParseErrorKind::OutOfRange, date_position);

        let year = match fields.year {
            Some((value, 2, 2)) => resolve_two_digit_year(value),
            Some((value, ..)) => value,
            None => 1970,
        };
        let year = if fields.bc { 1 - year } else { year };
        let year = i32::try_from(year).map_err(|_| out_of_range())?;
        let month = fields.month.unwrap_or(1);
        let day = fields.day.unwrap_or(1);
        let date = if self.lenient {
            roll_date(year, month, day).ok_or_else(out_of_range)?
        } else {
            let month = u32::try_from(month).map_err(|_| out_of_range())?;
            let day = u32::try_from(day).map_err(|_| out_of_range())?;
            NaiveDate::from_ymd_opt(year, month, day).ok_or_else(out_of_range)?
        };
        if let Some((weekday, position)) = fields.weekday {
            if !self.lenient && date.weekday() != weekday {
                return Err(ParseError::new(ParseErrorKind::WeekdayMismatch, position));
            }
        }

        let pm = i64::from(fields.pm.unwrap_or(false));
        let hour = match fields.hour {
            Some((Field::Hour12, hour)) => hour % 12 + pm * 12,
            Some((Field::Hour11, hour)) => hour + pm * 12,
            Some((Field::Hour24, hour)) => hour % 24,
            Some((_, hour)) => hour,
            None => 0,
        };
        let minute = fields.minute.unwrap_or(0);
        let second = fields.second.unwrap_or(0);
        let nanosecond = fields.nanosecond.unwrap_or(0);
        let time_error = || self.error(ParseErrorKind::OutOfRange);
        let naive = if self.lenient {
            let seconds = hour * 3600 + minute * 60 + second;
            date.and_hms_opt(0, 0, 0)
                .and_then(|midnight| midnight.checked_add_signed(TimeDelta::seconds(seconds)))
                .and_then(|dt| dt.checked_add_signed(TimeDelta::nanoseconds(nanosecond)))
                .ok_or_else(time_error)?
        } else {
            let time = u32::try_from(hour)
                .ok()
                .zip(u32::try_from(minute).ok())
                .zip(u32::try_from(second).ok())
                .zip(u32::try_from(nanosecond).ok())
                .and_then(|(((h, m), s), n)| NaiveTime::from_hms_nano_opt(h, m, s, n))
                .ok_or_else(time_error)?;
            NaiveDateTime::new(date, time)
        };

        if let Some(seconds) = fields.offset {
            let offset = FixedOffset::east_opt(seconds)
                .ok_or_else(|| self.error(ParseErrorKind::Offset))?;
            return offset
                .from_local_datetime(&naive)
                .single()
                .ok_or_else(|| self.error(ParseErrorKind::NonexistentLocalTime));
        }
        let zone = fields.zone.as_ref().unwrap_or(timezone);
        match zone.from_local(&naive).earliest() {
            Some(datetime) => Ok(datetime),
            None if self.lenient => naive
                .checked_add_signed(TimeDelta::hours(1))
                .and_then(|shifted| zone.from_local(&shifted).earliest())
                .ok_or_else(|| self.error(ParseErrorKind::NonexistentLocalTime)),
            None => Err(self.error(ParseErrorKind::NonexistentLocalTime)),
        }
    }
}

/// Places a two-digit year within 80 years before and 20 years after now.
fn resolve_two_digit_year(value: i64) -> i64 {
    let start = i64::from(Utc::now().year() - TWO_DIGIT_YEAR_LOOKBACK);
    let year = start.div_euclid(100) * 100 + value;
    if year < start { year + 100 } else { year }
}

/// Builds a date where months and days may overflow into the following ones.
fn roll_date(year: i32, month: i64, day: i64) -> Option<NaiveDate> {
    let months = i64::from(year) * 12 + month - 1;
    let year = i32::try_from(months.div_euclid(12)).ok()?;
    let month = u32::try_from(months.rem_euclid(12) + 1).ok()?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    if day >= 1 {
        first.checked_add_days(Days::new(u64::try_from(day - 1).ok()?))
    } else {
        first.checked_sub_days(Days::new(u64::try_from(1 - day).ok()?))
    }
}

/// Compares two characters case-insensitively.
fn eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Returns the byte length of `input`'s prefix matching `name` case-insensitively.
fn match_prefix(input: &str, name: &str) -> Option<usize> {
    let mut chars = input.chars();
    for expected in name.chars() {
        let actual = chars.next()?;
        if !eq_ignore_case(actual, expected) {
            return None;
        }
    }
    Some(input.len() - chars.as_str().len())
}
