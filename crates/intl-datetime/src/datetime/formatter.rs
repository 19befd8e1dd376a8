use super::{
    CalendarKind, DateTimeStyle, FormatterError, LocaleData, ParseError, ParseErrorKind, Pattern,
    TimeZone, locale, parser,
    pattern::{Field, Token},
};
use crate::validation::Validator;
use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use std::fmt;
use unic_langid::LanguageIdentifier;

/// A locale-aware formatter and parser for date times.
///
/// # Examples
///
/// ```rust
/// use intl_datetime::datetime::{CalendarKind, DateFormatter, DateTimeStyle};
///
/// let mut formatter = DateFormatter::try_new(
///     "en_US",
///     DateTimeStyle::Full,
///     DateTimeStyle::None,
///     "UTC",
///     CalendarKind::Gregorian,
///     None,
/// )?;
/// formatter.set_lenient(false);
/// assert_eq!(formatter.pattern(), "EEEE, MMMM d, y");
/// assert!(formatter.parse("Tuesday, June 3, 2014").is_ok());
/// assert!(formatter.parse("Monday, June 3, 2014").is_err());
/// # Ok::<(), intl_datetime::datetime::FormatterError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DateFormatter {
    /// Locale identifier.
    locale: LanguageIdentifier,
    /// Locale symbols and patterns.
    data: &'static LocaleData,
    /// Date style.
    date_style: DateTimeStyle,
    /// Time style.
    time_style: DateTimeStyle,
    /// Time zone.
    timezone: TimeZone,
    /// Calendar.
    calendar: CalendarKind,
    /// Effective pattern.
    pattern: Pattern,
    /// Lenient parsing.
    lenient: bool,
}

impl DateFormatter {
    /// Creates a new instance.
    ///
    /// The pattern overrides the styles if given. The formatter is lenient
    /// until [`set_lenient(false)`](Self::set_lenient) is called.
    pub fn try_new(
        locale: &str,
        date_style: DateTimeStyle,
        time_style: DateTimeStyle,
        timezone: &str,
        calendar: CalendarKind,
        pattern: Option<&str>,
    ) -> Result<Self, FormatterError> {
        let locale = locale::parse_locale(locale)?;
        let data = LocaleData::resolve(&locale);
        let timezone = TimeZone::parse(timezone)?;
        let pattern = match pattern {
            Some(pattern) => Pattern::parse(pattern)?,
            None => Pattern::parse(&data.style_pattern(date_style, time_style))?,
        };
        Ok(Self {
            locale,
            data,
            date_style,
            time_style,
            timezone,
            calendar,
            pattern,
            lenient: true,
        })
    }

    /// Enables or disables lenient parsing.
    #[inline]
    pub fn set_lenient(&mut self, lenient: bool) {
        self.lenient = lenient;
    }

    /// Returns `true` if parsing is lenient.
    #[inline]
    pub fn is_lenient(&self) -> bool {
        self.lenient
    }

    /// Returns the locale identifier.
    #[inline]
    pub fn locale(&self) -> &LanguageIdentifier {
        &self.locale
    }

    /// Returns the locale data in use.
    #[inline]
    pub fn locale_data(&self) -> &'static LocaleData {
        self.data
    }

    /// Returns the effective pattern.
    #[inline]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Returns the time zone identifier.
    #[inline]
    pub fn timezone_id(&self) -> &str {
        self.timezone.id()
    }

    /// Returns the calendar.
    #[inline]
    pub fn calendar(&self) -> CalendarKind {
        self.calendar
    }

    /// Returns the date style.
    #[inline]
    pub fn date_style(&self) -> DateTimeStyle {
        self.date_style
    }

    /// Returns the time style.
    #[inline]
    pub fn time_style(&self) -> DateTimeStyle {
        self.time_style
    }

    /// Parses a date time starting at the byte offset `start`.
    ///
    /// Returns the value and the byte offset where parsing stopped,
    /// which may be short of the end of `value`.
    pub fn parse_prefix(
        &self,
        value: &str,
        start: usize,
    ) -> Result<(DateTime<FixedOffset>, usize), ParseError> {
        parser::parse(
            &self.pattern,
            self.data,
            &self.timezone,
            self.lenient,
            value,
            start,
        )
    }

    /// Parses a whole string as a date time.
    pub fn parse(&self, value: &str) -> Result<DateTime<FixedOffset>, ParseError> {
        let (datetime, position) = self.parse_prefix(value, 0)?;
        if position != value.len() {
            return Err(ParseError::new(ParseErrorKind::TrailingInput, position));
        }
        Ok(datetime)
    }

    /// Formats a date time in the formatter's time zone.
    pub fn format<Tz: chrono::TimeZone>(&self, datetime: &DateTime<Tz>) -> String {
        let datetime = self.timezone.from_utc(&datetime.naive_utc());
        Formatted {
            formatter: self,
            datetime,
        }
        .to_string()
    }

    /// Formats a Unix timestamp in seconds.
    ///
    /// Returns `None` if the timestamp is out of range.
    pub fn format_timestamp(&self, secs: i64) -> Option<String> {
        DateTime::from_timestamp(secs, 0).map(|datetime| self.format(&datetime))
    }

    /// Writes a single field.
    fn write_field(
        &self,
        f: &mut fmt::Formatter,
        datetime: &DateTime<FixedOffset>,
        field: Field,
        width: usize,
    ) -> fmt::Result {
        let data = self.data;
        let offset = datetime.offset().local_minus_utc();
        match field {
            Field::Era => f.write_str(data.eras()[usize::from(datetime.year() > 0)]),
            Field::Year => {
                let year = datetime.year();
                let year = if year <= 0 && self.pattern.has_era() {
                    1 - year
                } else {
                    year
                };
                if width == 2 {
                    write!(f, "{:02}", year.rem_euclid(100))
                } else if year < 0 {
                    write!(f, "-{:0width$}", year.unsigned_abs())
                } else {
                    write!(f, "{year:0width$}")
                }
            }
            Field::Month => {
                let month = datetime.month();
                let index = datetime.month0() as usize;
                match width {
                    1 | 2 => write!(f, "{month:0width$}"),
                    3 => f.write_str(data.months_abbr()[index]),
                    _ => f.write_str(data.months()[index]),
                }
            }
            Field::Day => write!(f, "{:0width$}", datetime.day()),
            Field::Weekday => {
                let index = datetime.weekday().num_days_from_sunday() as usize;
                if width <= 3 {
                    f.write_str(data.weekdays_abbr()[index])
                } else {
                    f.write_str(data.weekdays()[index])
                }
            }
            Field::DayPeriod => f.write_str(data.day_periods()[usize::from(datetime.hour() >= 12)]),
            Field::Hour12 => {
                let hour = match datetime.hour() % 12 {
                    0 => 12,
                    hour => hour,
                };
                write!(f, "{hour:0width$}")
            }
            Field::Hour23 => write!(f, "{:0width$}", datetime.hour()),
            Field::Hour24 => {
                let hour = match datetime.hour() {
                    0 => 24,
                    hour => hour,
                };
                write!(f, "{hour:0width$}")
            }
            Field::Hour11 => write!(f, "{:0width$}", datetime.hour() % 12),
            Field::Minute => write!(f, "{:0width$}", datetime.minute()),
            Field::Second => write!(f, "{:0width$}", datetime.second()),
            Field::Fraction => {
                let digits = format!("{:09}", datetime.nanosecond() % 1_000_000_000);
                if width <= 9 {
                    f.write_str(&digits[..width])
                } else {
                    write!(f, "{digits:0<width$}")
                }
            }
            Field::ZoneGmt => write_gmt_offset(f, offset, width >= 4),
            Field::ZoneRfc => match width {
                1..=3 => write_iso_offset(f, offset, 2, false),
                4 => write_gmt_offset(f, offset, true),
                _ => write_iso_offset(f, offset, 3, true),
            },
            Field::ZoneIsoUtc => write_iso_offset(f, offset, width, true),
            Field::ZoneIso => write_iso_offset(f, offset, width, false),
            Field::ZoneId => f.write_str(self.timezone.id()),
        }
    }
}

impl Validator<str> for DateFormatter {
    type Error = ParseError;

    #[inline]
    fn validate(&self, data: &str) -> Result<(), Self::Error> {
        self.parse(data).map(|_| ())
    }
}

/// A date time bound to the formatter rendering it.
struct Formatted<'a> {
    /// Formatter.
    formatter: &'a DateFormatter,
    /// Date time in the formatter's time zone.
    datetime: DateTime<FixedOffset>,
}

impl fmt::Display for Formatted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for token in self.formatter.pattern.tokens() {
            match token {
                Token::Literal(text) => f.write_str(text)?,
                Token::Field(field, width) => {
                    self.formatter
                        .write_field(f, &self.datetime, *field, *width)?;
                }
            }
        }
        Ok(())
    }
}

/// Splits an offset in seconds into a sign, hours and minutes.
fn split_offset(seconds: i32) -> (char, i32, i32) {
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.abs() / 60;
    (sign, minutes / 60, minutes % 60)
}

/// Writes a localized GMT offset like `GMT+5:30` or, in the long form, `GMT+05:30`.
fn write_gmt_offset(f: &mut fmt::Formatter, seconds: i32, long: bool) -> fmt::Result {
    if seconds == 0 {
        return f.write_str("GMT");
    }
    let (sign, hours, minutes) = split_offset(seconds);
    if long {
        write!(f, "GMT{sign}{hours:02}:{minutes:02}")
    } else if minutes == 0 {
        write!(f, "GMT{sign}{hours}")
    } else {
        write!(f, "GMT{sign}{hours}:{minutes:02}")
    }
}

/// Writes an ISO 8601 offset like `+05`, `+0530` or `+05:30`.
fn write_iso_offset(
    f: &mut fmt::Formatter,
    seconds: i32,
    width: usize,
    utc_z: bool,
) -> fmt::Result {
    if utc_z && seconds == 0 {
        return f.write_str("Z");
    }
    let (sign, hours, minutes) = split_offset(seconds);
    match width {
        1 if minutes == 0 => write!(f, "{sign}{hours:02}"),
        1 | 2 => write!(f, "{sign}{hours:02}{minutes:02}"),
        _ => write!(f, "{sign}{hours:02}:{minutes:02}"),
    }
}

#[cfg(test)]
mod tests {
    use super::DateFormatter;
    use crate::{
        datetime::{CalendarKind, DateTimeStyle, ParseErrorKind},
        validation::Validator,
    };
    use chrono::{Datelike, NaiveDate, TimeZone, Utc};

    fn strict(locale: &str, pattern: &str, timezone: &str) -> DateFormatter {
        let mut formatter = DateFormatter::try_new(
            locale,
            DateTimeStyle::None,
            DateTimeStyle::None,
            timezone,
            CalendarKind::Gregorian,
            Some(pattern),
        )
        .unwrap();
        formatter.set_lenient(false);
        formatter
    }

    #[test]
    fn it_builds_formatters() -> anyhow::Result<()> {
        let formatter = DateFormatter::try_new(
            "en_US",
            DateTimeStyle::Full,
            DateTimeStyle::None,
            "Europe/Berlin",
            CalendarKind::Gregorian,
            None,
        )?;
        assert!(formatter.is_lenient());
        assert_eq!(formatter.locale().to_string(), "en-US");
        assert_eq!(formatter.pattern(), "EEEE, MMMM d, y");
        assert_eq!(formatter.timezone_id(), "Europe/Berlin");
        assert_eq!(formatter.calendar(), CalendarKind::Gregorian);
        assert_eq!(formatter.date_style(), DateTimeStyle::Full);
        assert_eq!(formatter.time_style(), DateTimeStyle::None);

        let fallback = DateFormatter::try_new(
            "en",
            DateTimeStyle::None,
            DateTimeStyle::None,
            "UTC",
            CalendarKind::Gregorian,
            None,
        )?;
        assert_eq!(fallback.pattern(), "yyyyMMdd hh:mm a");

        assert!(
            DateFormatter::try_new(
                "not-a-real-locale!!",
                DateTimeStyle::Full,
                DateTimeStyle::None,
                "UTC",
                CalendarKind::Gregorian,
                None,
            )
            .is_err()
        );
        assert!(
            DateFormatter::try_new(
                "en",
                DateTimeStyle::Full,
                DateTimeStyle::None,
                "Mars/Olympus_Mons",
                CalendarKind::Gregorian,
                None,
            )
            .is_err()
        );
        Ok(())
    }

    #[test]
    fn it_formats_datetimes() {
        let datetime = Utc.with_ymd_and_hms(2014, 6, 3, 13, 5, 9).unwrap();
        let formatter = strict("en", "EEEE, MMMM d, y 'at' h:mm:ss a", "UTC");
        assert_eq!(
            formatter.format(&datetime),
            "Tuesday, June 3, 2014 at 1:05:09 PM"
        );

        let formatter = strict("en", "yyyy-MM-dd'T'HH:mm:ss.SSSXXX", "Asia/Kolkata");
        assert_eq!(
            formatter.format(&datetime),
            "2014-06-03T18:35:09.000+05:30"
        );

        let formatter = strict("de", "EEEE, d. MMMM y", "Europe/Berlin");
        assert_eq!(formatter.format(&datetime), "Dienstag, 3. Juni 2014");

        let formatter = strict("en", "h:mm a z", "America/New_York");
        assert_eq!(formatter.format(&datetime), "9:05 AM GMT-4");

        let formatter = strict("en", "yy-M-d k K G", "UTC");
        assert_eq!(formatter.format(&datetime), "14-6-3 13 1 AD");

        let datetime = Utc.with_ymd_and_hms(-99, 6, 3, 0, 0, 0).unwrap();
        let formatter = strict("en", "y G", "UTC");
        assert_eq!(formatter.format(&datetime), "100 BC");
        let formatter = strict("en", "EEEE, MMMM d, y", "UTC");
        assert_eq!(formatter.format(&datetime), "Monday, June 3, -99");
        let formatter = strict("en", "yyyyMMdd", "UTC");
        assert_eq!(formatter.format(&datetime), "-00990603");

        let formatter = strict("en", "yyyy-MM-dd HH:mm", "UTC");
        assert_eq!(
            formatter.format_timestamp(1_401_800_709).as_deref(),
            Some("2014-06-03 13:05")
        );
        assert!(formatter.format_timestamp(i64::MAX).is_none());
    }

    #[test]
    fn it_parses_strictly() -> anyhow::Result<()> {
        let formatter = strict("en", "EEEE, MMMM d, y", "UTC");
        let datetime = formatter.parse("Tuesday, June 3, 2014")?;
        assert_eq!(datetime.date_naive(), NaiveDate::from_ymd_opt(2014, 6, 3).unwrap());

        let (_, position) = formatter.parse_prefix("Tuesday, June 3, 2014 garbage", 0)?;
        assert_eq!(position, 21);
        let err = formatter.parse("Tuesday, June 3, 2014 garbage").unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::TrailingInput);
        assert_eq!(err.position(), 21);

        let err = formatter.parse("Monday, June 3, 2014").unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::WeekdayMismatch);
        let err = formatter.parse("Tue, June 3, 2014").unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::Name);

        let formatter = strict("en", "yyyy-MM-dd", "UTC");
        let err = formatter.parse("2014-02-30").unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::OutOfRange);
        assert_eq!(err.kind(), formatter.validate("2014-13-01").unwrap_err().kind());
        assert!(formatter.validate("2014-02-28").is_ok());
        assert!(formatter.parse("2014/02/28").is_err());

        let formatter = strict("en", "yy-MM-dd", "UTC");
        assert_eq!(formatter.parse("14-06-03")?.year(), 2014);
        let formatter = strict("en", "y-MM-dd", "UTC");
        assert_eq!(formatter.parse("14-06-03")?.year(), 14);
        assert_eq!(formatter.parse("-99-06-03")?.year(), -99);
        let formatter = strict("en", "y-MM-dd G", "UTC");
        assert_eq!(formatter.parse("100-06-03 BC")?.year(), -99);
        assert!(formatter.parse("-99-06-03 AD").is_err());
        Ok(())
    }

    #[test]
    fn it_parses_leniently() -> anyhow::Result<()> {
        let mut formatter = strict("en", "yyyy-MM-dd", "UTC");
        formatter.set_lenient(true);
        let datetime = formatter.parse("2014-02-30")?;
        assert_eq!(datetime.date_naive(), NaiveDate::from_ymd_opt(2014, 3, 2).unwrap());

        let mut formatter = strict("en", "EEEE, MMMM d, y", "UTC");
        formatter.set_lenient(true);
        assert!(formatter.parse("monday,   Jun 3, 2014").is_ok());
        Ok(())
    }

    #[test]
    fn it_parses_zones() -> anyhow::Result<()> {
        let formatter = strict("en", "yyyy-MM-dd HH:mm XXX", "UTC");
        let datetime = formatter.parse("2014-06-03 13:05 +02:00")?;
        assert_eq!(datetime.offset().local_minus_utc(), 7200);
        assert!(formatter.parse("2014-06-03 13:05 +0200").is_err());

        let formatter = strict("en", "yyyy-MM-dd HH:mm VV", "UTC");
        let datetime = formatter.parse("2014-01-03 13:05 Europe/Berlin")?;
        assert_eq!(datetime.offset().local_minus_utc(), 3600);

        let formatter = strict("en", "yyyy-MM-dd HH:mm", "Europe/Berlin");
        let err = formatter.parse("2014-03-30 02:30").unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::NonexistentLocalTime);
        Ok(())
    }

    #[test]
    fn it_round_trips_across_eras() -> anyhow::Result<()> {
        for year in [-2014, -99, 0, 1, 14, 99, 100, 999, 1582, 2014, 9999] {
            let datetime = Utc.with_ymd_and_hms(year, 6, 3, 13, 5, 0).unwrap();
            for locale in ["en", "de", "zh"] {
                let date_styles = [DateTimeStyle::Full, DateTimeStyle::Long, DateTimeStyle::Medium];
                for date_style in date_styles {
                    let mut formatter = DateFormatter::try_new(
                        locale,
                        date_style,
                        DateTimeStyle::Short,
                        "UTC",
                        CalendarKind::Gregorian,
                        None,
                    )?;
                    formatter.set_lenient(false);
                    let text = formatter.format(&datetime);
                    let parsed = formatter.parse(&text)?;
                    assert_eq!(parsed, datetime, "{locale}: {text}");
                }
            }
            for pattern in ["EEEE, d MMMM y G HH:mm", "yyyyMMdd HH:mm", "yyyy-MM-dd'T'HH:mmXXX"] {
                let formatter = strict("en", pattern, "UTC");
                let text = formatter.format(&datetime);
                assert_eq!(formatter.parse(&text)?, datetime, "{pattern}: {text}");
            }
        }
        Ok(())
    }

    #[test]
    fn it_round_trips_localized_styles() -> anyhow::Result<()> {
        let datetime = Utc.with_ymd_and_hms(2014, 6, 3, 13, 5, 0).unwrap();
        for locale in ["en", "en-GB", "de", "fr", "es", "zh"] {
            for date_style in [DateTimeStyle::Full, DateTimeStyle::Long, DateTimeStyle::Medium] {
                let mut formatter = DateFormatter::try_new(
                    locale,
                    date_style,
                    DateTimeStyle::Short,
                    "Europe/Paris",
                    CalendarKind::Gregorian,
                    None,
                )?;
                formatter.set_lenient(false);
                let text = formatter.format(&datetime);
                let parsed = formatter.parse(&text)?;
                assert_eq!(parsed, datetime, "{locale}: {text}");
            }
        }
        Ok(())
    }
}
