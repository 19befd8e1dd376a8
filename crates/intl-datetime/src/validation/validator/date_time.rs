use super::super::Validation;
use crate::{
    JsonValue, Map, SharedString,
    datetime::{self, CalendarKind, DateFormatter, DateTimeStyle, ParseError, ParseErrorKind},
    error::{Error, bail, warn_error},
    extension::JsonObjectExt,
    state::{Environment, SystemEnv},
};
use std::sync::Arc;

/// A validator for localized date time strings.
///
/// The input must be fully consumed by a non-lenient parse with the
/// configured locale, styles, time zone, calendar and pattern.
/// The underlying [`DateFormatter`] is built lazily and rebuilt only after
/// the configuration changes.
///
/// # Examples
///
/// ```rust
/// use intl_datetime::{datetime::DateTimeStyle, state::FixedEnv, validation::DateTimeValidator};
///
/// let mut validator = DateTimeValidator::with_env(FixedEnv::new("en_US", "UTC"));
/// validator.set_date_format(DateTimeStyle::Full);
/// assert!(validator.is_valid_str("Tuesday, June 3, 2014")?);
/// assert!(!validator.is_valid_str("Tuesday, June 3, 2014 garbage")?);
/// assert_eq!(validator.error_codes(), [DateTimeValidator::INVALID_DATETIME]);
/// # Ok::<(), intl_datetime::error::Error>(())
/// ```
#[derive(Debug)]
pub struct DateTimeValidator {
    /// Provider of the default locale and time zone.
    env: Arc<dyn Environment>,
    /// Locale identifier.
    locale: Option<String>,
    /// Date style.
    date_format: Option<DateTimeStyle>,
    /// Time style.
    time_format: Option<DateTimeStyle>,
    /// Time zone identifier.
    timezone: Option<String>,
    /// Calendar.
    calendar: Option<CalendarKind>,
    /// Custom pattern.
    pattern: Option<String>,
    /// Cached formatter.
    formatter: Option<DateFormatter>,
    /// `true` if the cached formatter no longer reflects the configuration.
    invalidate: bool,
    /// Message templates keyed by error code.
    templates: Map,
    /// Failures of the last validation.
    validation: Validation,
    /// Subject of the last validation.
    value: Option<JsonValue>,
}

impl DateTimeValidator {
    /// Error code for a value which is not a string.
    pub const INVALID: &'static str = "datetimeInvalid";

    /// Error code for a string which is not a valid date time.
    pub const INVALID_DATETIME: &'static str = "datetimeInvalidDateTime";

    /// Default message templates.
    const TEMPLATES: [(&'static str, &'static str); 2] = [
        (Self::INVALID, "Invalid type given. String expected"),
        (
            Self::INVALID_DATETIME,
            "The input does not appear to be a valid datetime",
        ),
    ];

    /// Creates a new instance with the defaults of the process environment.
    #[inline]
    pub fn new() -> Self {
        Self::with_env(SystemEnv)
    }

    /// Creates a new instance with the defaults of a custom environment.
    pub fn with_env(env: impl Environment + 'static) -> Self {
        let mut templates = Map::new();
        for (code, template) in Self::TEMPLATES {
            templates.upsert(code, template);
        }
        Self {
            env: Arc::new(env),
            locale: None,
            date_format: None,
            time_format: None,
            timezone: None,
            calendar: None,
            pattern: None,
            formatter: None,
            invalidate: false,
            templates,
            validation: Validation::new(),
            value: None,
        }
    }

    /// Creates a new instance with the options.
    ///
    /// Supported keys are `calendar`, `date_format`, `locale`, `pattern`,
    /// `time_format`, `timezone` and `messages`. Defaults come from [`SystemEnv`];
    /// see [`with_env_and_options`](Self::with_env_and_options) for another environment.
    #[inline]
    pub fn with_options<K, V>(options: impl IntoIterator<Item = (K, V)>) -> Result<Self, Error>
    where
        K: AsRef<str>,
        V: Into<JsonValue>,
    {
        Self::with_env_and_options(SystemEnv, options)
    }

    /// Creates a new instance with the options and the defaults of a custom environment.
    pub fn with_env_and_options<K, V>(
        env: impl Environment + 'static,
        options: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, Error>
    where
        K: AsRef<str>,
        V: Into<JsonValue>,
    {
        let mut validator = Self::with_env(env);
        validator.set_options(options)?;
        Ok(validator)
    }

    /// Applies the options.
    ///
    /// Unknown keys and values of an unexpected type are rejected.
    pub fn set_options<K, V>(
        &mut self,
        options: impl IntoIterator<Item = (K, V)>,
    ) -> Result<&mut Self, Error>
    where
        K: AsRef<str>,
        V: Into<JsonValue>,
    {
        for (key, value) in options {
            let key = key.as_ref();
            self.set_option(key, value.into())
                .map_err(|err| err.wrap(format!("fail to apply the option `{key}`")))?;
        }
        Ok(self)
    }

    /// Applies a single option.
    fn set_option(&mut self, key: &str, value: JsonValue) -> Result<(), Error> {
        match key {
            "calendar" => {
                let calendar = match value {
                    JsonValue::String(ref name) => name.parse::<CalendarKind>()?,
                    JsonValue::Number(ref number) => {
                        match number.as_i64().and_then(CalendarKind::from_icu) {
                            Some(calendar) => calendar,
                            None => bail!("invalid calendar constant `{number}`"),
                        }
                    }
                    _ => bail!("a string or an integer is expected"),
                };
                self.set_calendar(calendar);
            }
            "date_format" => {
                let style = parse_style(&value)?;
                self.set_date_format(style);
            }
            "time_format" => {
                let style = parse_style(&value)?;
                self.set_time_format(style);
            }
            "locale" => match value {
                JsonValue::String(locale) => {
                    datetime::parse_locale(&locale)?;
                    self.set_locale(locale);
                }
                _ => bail!("a string is expected"),
            },
            "timezone" => match value {
                JsonValue::String(timezone) => {
                    self.set_timezone(timezone);
                }
                _ => bail!("a string is expected"),
            },
            "pattern" => match value {
                JsonValue::String(pattern) => {
                    self.set_pattern(pattern);
                }
                JsonValue::Null => {
                    self.pattern = None;
                    self.invalidate = true;
                }
                _ => bail!("a string is expected"),
            },
            "messages" => match value {
                JsonValue::Object(messages) => {
                    for (code, template) in messages {
                        match template {
                            JsonValue::String(template) => {
                                self.set_message(&code, template)?;
                            }
                            _ => bail!("the template for `{code}` should be a string"),
                        }
                    }
                }
                _ => bail!("an object is expected"),
            },
            _ => return Err(warn_error!("unknown option `{key}`")),
        }
        Ok(())
    }

    /// Sets the locale.
    #[inline]
    pub fn set_locale(&mut self, locale: impl Into<String>) -> &mut Self {
        self.locale = Some(locale.into());
        self.invalidate = true;
        self
    }

    /// Sets the date style.
    #[inline]
    pub fn set_date_format(&mut self, style: DateTimeStyle) -> &mut Self {
        self.date_format = Some(style);
        self.invalidate = true;
        self
    }

    /// Sets the time style.
    #[inline]
    pub fn set_time_format(&mut self, style: DateTimeStyle) -> &mut Self {
        self.time_format = Some(style);
        self.invalidate = true;
        self
    }

    /// Sets the time zone.
    #[inline]
    pub fn set_timezone(&mut self, timezone: impl Into<String>) -> &mut Self {
        self.timezone = Some(timezone.into());
        self.invalidate = true;
        self
    }

    /// Sets a custom pattern which overrides the styles.
    #[inline]
    pub fn set_pattern(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.pattern = Some(pattern.into());
        self.invalidate = true;
        self
    }

    /// Sets the calendar.
    #[inline]
    pub fn set_calendar(&mut self, calendar: CalendarKind) -> &mut Self {
        self.calendar = Some(calendar);
        self.invalidate = true;
        self
    }

    /// Overrides the message template for an error code.
    ///
    /// The placeholder `%value%` is replaced by the validated value.
    pub fn set_message(
        &mut self,
        code: &str,
        template: impl Into<String>,
    ) -> Result<&mut Self, Error> {
        if !self.templates.contains_key(code) {
            bail!("unknown message code `{code}`");
        }
        let template: String = template.into();
        self.templates.upsert(code, template);
        Ok(self)
    }

    /// Returns the locale.
    pub fn locale(&self) -> SharedString {
        match &self.locale {
            Some(locale) => locale.clone().into(),
            None => self.env.default_locale(),
        }
    }

    /// Returns the date style.
    #[inline]
    pub fn date_format(&self) -> DateTimeStyle {
        self.date_format.unwrap_or_default()
    }

    /// Returns the time style.
    #[inline]
    pub fn time_format(&self) -> DateTimeStyle {
        self.time_format.unwrap_or_default()
    }

    /// Returns the time zone.
    ///
    /// Once a formatter is built, this is the identifier it resolved.
    pub fn timezone(&self) -> SharedString {
        match self.live_formatter() {
            Some(formatter) => formatter.timezone_id().to_owned().into(),
            None => self.configured_timezone(),
        }
    }

    /// Returns the calendar.
    pub fn calendar(&self) -> CalendarKind {
        match self.live_formatter() {
            Some(formatter) => formatter.calendar(),
            None => self.calendar.unwrap_or_default(),
        }
    }

    /// Returns the pattern.
    ///
    /// Once a formatter is built, this is the pattern derived from the styles
    /// if no custom pattern is set.
    pub fn pattern(&self) -> Option<&str> {
        match self.live_formatter() {
            Some(formatter) => Some(formatter.pattern()),
            None => self.pattern.as_deref(),
        }
    }

    /// Returns `true` if the value is a string representing a valid date time.
    ///
    /// Failures are recorded and replace those of the previous call.
    /// An error is returned if the formatter can not be built from the configuration.
    pub fn is_valid(&mut self, value: &JsonValue) -> Result<bool, Error> {
        self.validation.clear();
        let Some(s) = value.as_str() else {
            self.value = None;
            self.record(Self::INVALID, &value.to_string(), None);
            return Ok(false);
        };
        self.value = Some(value.clone());
        self.check(s)
    }

    /// Returns `true` if the string represents a valid date time.
    pub fn is_valid_str(&mut self, value: &str) -> Result<bool, Error> {
        self.validation.clear();
        self.value = Some(value.into());
        self.check(value)
    }

    /// Returns the subject of the last validation.
    #[inline]
    pub fn value(&self) -> Option<&JsonValue> {
        self.value.as_ref()
    }

    /// Returns `true` if the last validation recorded no failure.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.validation.is_success()
    }

    /// Returns the error codes of the last validation.
    #[inline]
    pub fn error_codes(&self) -> Vec<&str> {
        self.validation.invalid_params()
    }

    /// Returns the error messages of the last validation keyed by error code.
    #[inline]
    pub fn messages(&self) -> Map {
        self.validation.to_map()
    }

    /// Returns the validation record of the last validation.
    #[inline]
    pub fn validation(&self) -> &Validation {
        &self.validation
    }

    /// Returns the formatter, building it if the configuration has changed.
    pub(crate) fn formatter(&mut self) -> Result<&DateFormatter, Error> {
        if self.invalidate || self.formatter.is_none() {
            let locale = self.locale();
            let timezone = self.configured_timezone();
            let mut formatter = DateFormatter::try_new(
                &locale,
                self.date_format(),
                self.time_format(),
                &timezone,
                self.calendar.unwrap_or_default(),
                self.pattern.as_deref(),
            )?;
            formatter.set_lenient(false);
            tracing::debug!(
                locale = %locale,
                pattern = formatter.pattern(),
                timezone = formatter.timezone_id(),
                "date formatter rebuilt"
            );
            self.invalidate = false;
            return Ok(&*self.formatter.insert(formatter));
        }
        self.formatter
            .as_ref()
            .ok_or_else(|| Error::new("the date formatter is not built"))
    }

    /// Returns the cached formatter if it reflects the configuration.
    #[inline]
    fn live_formatter(&self) -> Option<&DateFormatter> {
        self.formatter.as_ref().filter(|_| !self.invalidate)
    }

    /// Returns the configured time zone or the default one.
    fn configured_timezone(&self) -> SharedString {
        match &self.timezone {
            Some(timezone) => timezone.clone().into(),
            None => self.env.default_timezone(),
        }
    }

    /// Parses the string and records a failure if it is not fully consumed.
    fn check(&mut self, value: &str) -> Result<bool, Error> {
        let formatter = self.formatter()?;
        let result = match formatter.parse_prefix(value, 0) {
            Ok((_, position)) if position == value.len() => Ok(()),
            Ok((_, position)) => Err(ParseError::new(ParseErrorKind::TrailingInput, position)),
            Err(err) => Err(err),
        };
        match result {
            Ok(()) => Ok(true),
            Err(err) => {
                self.record(Self::INVALID_DATETIME, value, Some(err));
                tracing::debug!(value, validation = %self.validation, "invalid date time");
                Ok(false)
            }
        }
    }

    /// Records a failure with the rendered message template.
    ///
    /// The parse error, if any, is kept as the source of the recorded error.
    fn record(&mut self, code: &'static str, value: &str, cause: Option<ParseError>) {
        let template = self.templates.get_str(code).unwrap_or_default();
        let message = template.replace("%value%", value);
        match cause {
            Some(err) => self
                .validation
                .record_fail(code, Error::with_source(message, err)),
            None => self.validation.record(code, message),
        }
    }
}

impl Default for DateTimeValidator {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Map> for DateTimeValidator {
    type Error = Error;

    #[inline]
    fn try_from(options: Map) -> Result<Self, Self::Error> {
        Self::with_options(options)
    }
}

/// Parses a style given by name or by ICU constant.
fn parse_style(value: &JsonValue) -> Result<DateTimeStyle, Error> {
    match value {
        JsonValue::String(name) => Ok(name.parse::<DateTimeStyle>()?),
        JsonValue::Number(number) => match number.as_i64().and_then(DateTimeStyle::from_icu) {
            Some(style) => Ok(style),
            None => bail!("invalid style constant `{number}`"),
        },
        _ => bail!("a string or an integer is expected"),
    }
}

#[cfg(test)]
mod tests {
    use super::DateTimeValidator;
    use crate::{
        datetime::{CalendarKind, DateTimeStyle},
        error::Error,
        state::FixedEnv,
    };
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn validator() -> DateTimeValidator {
        DateTimeValidator::with_env(FixedEnv::new("en_US", "UTC"))
    }

    #[test]
    fn it_validates_full_dates() -> Result<(), Error> {
        let mut validator = validator();
        validator.set_locale("en_US").set_date_format(DateTimeStyle::Full);
        assert!(validator.is_valid(&json!("Tuesday, June 3, 2014"))?);
        assert!(validator.is_success());
        assert_eq!(
            validator.value().and_then(|v| v.as_str()),
            Some("Tuesday, June 3, 2014")
        );

        assert!(!validator.is_valid(&json!("Tuesday, June 3, 2014 garbage"))?);
        assert_eq!(
            validator.error_codes(),
            [DateTimeValidator::INVALID_DATETIME]
        );
        assert_eq!(
            validator
                .messages()
                .get(DateTimeValidator::INVALID_DATETIME)
                .and_then(|v| v.as_str()),
            Some("The input does not appear to be a valid datetime")
        );
        assert_eq!(
            validator
                .validation()
                .get(DateTimeValidator::INVALID_DATETIME)
                .and_then(|err| err.source())
                .map(|err| err.message()),
            Some("trailing input at position 21")
        );
        Ok(())
    }

    #[test]
    fn it_rejects_out_of_range_dates() -> Result<(), Error> {
        let mut validator = validator();
        validator.set_pattern("yyyy-MM-dd");
        assert!(!validator.is_valid(&json!("2014-02-30"))?);
        assert_eq!(
            validator.error_codes(),
            [DateTimeValidator::INVALID_DATETIME]
        );
        assert!(validator.is_valid(&json!("2014-02-28"))?);
        assert!(validator.is_success());
        Ok(())
    }

    #[test]
    fn it_accepts_formatted_values() -> Result<(), Error> {
        let mut validator = validator();
        validator
            .set_locale("de_DE")
            .set_date_format(DateTimeStyle::Long)
            .set_time_format(DateTimeStyle::Medium)
            .set_timezone("Europe/Berlin");
        let text = validator
            .formatter()?
            .format_timestamp(1_401_800_709)
            .unwrap_or_default();
        assert_eq!(text, "3. Juni 2014 um 15:05:09");
        assert!(validator.is_valid_str(&text)?);

        let mut validator = DateTimeValidator::with_env(FixedEnv::new("en_US", "UTC"));
        validator.set_date_format(DateTimeStyle::Full);
        for year in [-99, 0, 14, 2014] {
            let datetime = Utc.with_ymd_and_hms(year, 6, 3, 0, 0, 0).unwrap();
            let text = validator.formatter()?.format(&datetime);
            assert!(validator.is_valid_str(&text)?, "{text}");
        }
        Ok(())
    }

    #[test]
    fn it_reports_configuration_errors() {
        let mut validator = validator();
        validator.set_locale("not-a-real-locale!!");
        let err = validator.is_valid(&json!("Tuesday, June 3, 2014")).unwrap_err();
        assert!(err.message().starts_with("invalid locale string given"));
        assert!(validator.is_success());

        let mut validator = DateTimeValidator::with_env(FixedEnv::new("en", "UTC"));
        validator.set_pattern("yyyy-ww");
        assert!(validator.is_valid_str("2014-23").is_err());

        validator.set_pattern("yyyy").set_timezone("Mars/Olympus_Mons");
        assert!(validator.is_valid_str("2014").is_err());

        validator.set_timezone("+\u{e9}1");
        let err = validator.is_valid_str("2014").unwrap_err();
        assert!(err.message().starts_with("invalid time zone given"));
        assert!(validator.is_success());
    }

    #[test]
    fn it_applies_defaults() {
        let validator = DateTimeValidator::with_env(FixedEnv::new("de-DE", "Europe/Berlin"));
        assert_eq!(validator.calendar(), CalendarKind::Gregorian);
        assert_eq!(validator.date_format(), DateTimeStyle::None);
        assert_eq!(validator.time_format(), DateTimeStyle::None);
        assert_eq!(validator.timezone(), "Europe/Berlin");
        assert_eq!(validator.locale(), "de-DE");
        assert_eq!(validator.pattern(), None);
    }

    #[test]
    fn it_is_idempotent() -> Result<(), Error> {
        let mut validator = validator();
        validator.set_date_format(DateTimeStyle::Full);
        for _ in 0..2 {
            assert!(!validator.is_valid(&json!("Monday, June 3, 2014"))?);
            assert_eq!(
                validator.error_codes(),
                [DateTimeValidator::INVALID_DATETIME]
            );
        }
        Ok(())
    }

    #[test]
    fn it_rejects_non_strings() -> Result<(), Error> {
        let mut validator = validator();
        validator.set_date_format(DateTimeStyle::Full);
        let values = [
            json!(null),
            json!(true),
            json!(20140603),
            json!(2014.5),
            json!(["Tuesday, June 3, 2014"]),
            json!({ "date": "Tuesday, June 3, 2014" }),
        ];
        for value in values {
            assert!(!validator.is_valid_str("Monday, June 3, 2014")?);
            assert_eq!(
                validator.error_codes(),
                [DateTimeValidator::INVALID_DATETIME]
            );

            assert!(!validator.is_valid(&value)?);
            assert_eq!(validator.error_codes(), [DateTimeValidator::INVALID]);
            assert_eq!(
                validator.validation().message(DateTimeValidator::INVALID),
                Some("Invalid type given. String expected")
            );
            assert!(validator.value().is_none());
        }

        validator.set_message(DateTimeValidator::INVALID, "`%value%` is not a string")?;
        assert!(!validator.is_valid(&json!(null))?);
        assert_eq!(
            validator.validation().message(DateTimeValidator::INVALID),
            Some("`null` is not a string")
        );
        Ok(())
    }

    #[test]
    fn it_reads_back_formatter_settings() -> Result<(), Error> {
        let mut validator = validator();
        validator
            .set_date_format(DateTimeStyle::Full)
            .set_timezone("GMT");
        assert_eq!(validator.pattern(), None);
        assert_eq!(validator.timezone(), "GMT");

        assert!(validator.is_valid_str("Tuesday, June 3, 2014")?);
        assert_eq!(validator.pattern(), Some("EEEE, MMMM d, y"));
        assert_eq!(validator.timezone(), "UTC");

        validator.set_time_format(DateTimeStyle::Short);
        assert_eq!(validator.pattern(), None);
        assert_eq!(validator.timezone(), "GMT");
        assert_eq!(validator.time_format(), DateTimeStyle::Short);

        assert!(validator.is_valid_str("Tuesday, June 3, 2014 at 3:05 PM")?);
        assert_eq!(validator.pattern(), Some("EEEE, MMMM d, y 'at' h:mm a"));
        Ok(())
    }

    #[test]
    fn it_parses_options() -> Result<(), Error> {
        let options = json!({
            "locale": "fr_FR",
            "date_format": 1,
            "time_format": "none",
            "calendar": "GREGORIAN",
            "timezone": "Europe/Paris",
            "messages": {
                "datetimeInvalidDateTime": "`%value%` is not a date",
            },
        });
        let mut validator = match options {
            serde_json::Value::Object(map) => DateTimeValidator::try_from(map)?,
            _ => unreachable!(),
        };
        assert_eq!(validator.locale(), "fr_FR");
        assert_eq!(validator.date_format(), DateTimeStyle::Long);
        assert!(validator.is_valid_str("3 juin 2014")?);
        assert!(!validator.is_valid_str("3 june 2014")?);
        assert_eq!(
            validator.validation().message(DateTimeValidator::INVALID_DATETIME),
            Some("`3 june 2014` is not a date")
        );

        let err =
            DateTimeValidator::with_options([("locale", "not-a-real-locale!!")]).unwrap_err();
        assert!(err.to_string().contains("invalid locale string given"));
        assert!(DateTimeValidator::with_options([("format", "full")]).is_err());
        assert!(DateTimeValidator::with_options([("locale", 1)]).is_err());
        assert!(DateTimeValidator::with_options([("date_format", 7)]).is_err());
        assert!(DateTimeValidator::with_options([("calendar", "julian")]).is_err());
        assert!(DateTimeValidator::with_options([("calendar", 0)]).is_ok());

        let env = FixedEnv::new("de-DE", "Europe/Berlin");
        let mut validator =
            DateTimeValidator::with_env_and_options(env, [("date_format", "medium")])?;
        assert_eq!(validator.locale(), "de-DE");
        assert_eq!(validator.timezone(), "Europe/Berlin");
        assert!(validator.is_valid_str("03.06.2014")?);
        Ok(())
    }
}
