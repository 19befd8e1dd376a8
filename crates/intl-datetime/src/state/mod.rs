//! Process defaults for locales and time zones.
//!
//! The validator never reads global state directly. It asks an [`Environment`]
//! for the default locale and time zone, so tests and applications can pin them.

use crate::{
    SharedString, TomlTable,
    datetime::TimeZone,
    error::Error,
    extension::TomlTableExt,
};
use chrono::{Local, Offset};
use std::{env, fmt};

/// Fallback locale when nothing else is configured.
const FALLBACK_LOCALE: &str = "en-US";

/// A provider of the default locale and time zone.
pub trait Environment: fmt::Debug + Send + Sync {
    /// Returns the default locale identifier.
    fn default_locale(&self) -> SharedString;

    /// Returns the default time zone identifier.
    fn default_timezone(&self) -> SharedString;
}

/// Defaults read from the process environment.
///
/// The locale comes from `LC_ALL`, `LC_TIME` or `LANG` (in that order) and
/// the time zone from `TZ`, falling back to the current local UTC offset.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEnv;

impl Environment for SystemEnv {
    fn default_locale(&self) -> SharedString {
        ["LC_ALL", "LC_TIME", "LANG"]
            .into_iter()
            .filter_map(|key| env::var(key).ok())
            .find_map(|value| parse_posix_locale(&value).map(|s| s.to_owned()))
            .map(SharedString::from)
            .unwrap_or(SharedString::Borrowed(FALLBACK_LOCALE))
    }

    fn default_timezone(&self) -> SharedString {
        if let Ok(tz) = env::var("TZ") {
            let tz = tz.trim_start_matches(':');
            if let Ok(timezone) = TimeZone::parse(tz) {
                return timezone.id().to_owned().into();
            }
            tracing::warn!(timezone = tz, "ignore the unrecognized `TZ` variable");
        }
        let offset = Local::now().offset().fix();
        TimeZone::from(offset).id().to_owned().into()
    }
}

/// Defaults loaded from the `[intl]` table of a TOML config.
///
/// ```toml
/// [intl]
/// default-locale = "de-DE"
/// default-timezone = "Europe/Berlin"
/// ```
///
/// Keys which are absent fall back to [`SystemEnv`].
#[derive(Debug, Default, Clone)]
pub struct ConfigEnv {
    /// Default locale.
    locale: Option<String>,
    /// Default time zone.
    timezone: Option<String>,
}

impl ConfigEnv {
    /// Creates a new instance from a parsed config table.
    pub fn from_table(config: &TomlTable) -> Self {
        let Some(intl) = config.get_table("intl") else {
            return Self::default();
        };
        Self {
            locale: intl.get_str("default-locale").map(|s| s.to_owned()),
            timezone: intl.get_str("default-timezone").map(|s| s.to_owned()),
        }
    }

    /// Parses a TOML config and creates a new instance.
    pub fn from_toml_str(config: &str) -> Result<Self, Error> {
        let table = config.parse::<TomlTable>().map_err(|err| {
            Error::with_source("fail to parse the TOML config", Error::new(err.to_string()))
        })?;
        Ok(Self::from_table(&table))
    }
}

impl Environment for ConfigEnv {
    fn default_locale(&self) -> SharedString {
        match &self.locale {
            Some(locale) => locale.clone().into(),
            None => SystemEnv.default_locale(),
        }
    }

    fn default_timezone(&self) -> SharedString {
        match &self.timezone {
            Some(timezone) => timezone.clone().into(),
            None => SystemEnv.default_timezone(),
        }
    }
}

/// Pinned defaults.
#[derive(Debug, Clone)]
pub struct FixedEnv {
    /// Default locale.
    locale: SharedString,
    /// Default time zone.
    timezone: SharedString,
}

impl FixedEnv {
    /// Creates a new instance.
    #[inline]
    pub fn new(locale: impl Into<SharedString>, timezone: impl Into<SharedString>) -> Self {
        Self {
            locale: locale.into(),
            timezone: timezone.into(),
        }
    }
}

impl Environment for FixedEnv {
    #[inline]
    fn default_locale(&self) -> SharedString {
        self.locale.clone()
    }

    #[inline]
    fn default_timezone(&self) -> SharedString {
        self.timezone.clone()
    }
}

/// Strips the codeset and modifier from a POSIX locale like `de_DE.UTF-8@euro`.
fn parse_posix_locale(value: &str) -> Option<&str> {
    let locale = value
        .split(['.', '@'])
        .next()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())?;
    if locale == "C" || locale == "POSIX" {
        None
    } else {
        Some(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigEnv, Environment, FixedEnv, parse_posix_locale};
    use crate::error::Error;

    #[test]
    fn it_parses_posix_locales() {
        assert_eq!(parse_posix_locale("de_DE.UTF-8@euro"), Some("de_DE"));
        assert_eq!(parse_posix_locale("en_US"), Some("en_US"));
        assert_eq!(parse_posix_locale("C.UTF-8"), None);
        assert_eq!(parse_posix_locale("POSIX"), None);
        assert_eq!(parse_posix_locale(""), None);
    }

    #[test]
    fn it_loads_config_defaults() -> Result<(), Error> {
        let env = ConfigEnv::from_toml_str(
            r#"
            [intl]
            default-locale = "fr-FR"
            default-timezone = "Europe/Paris"
            "#,
        )?;
        assert_eq!(env.default_locale(), "fr-FR");
        assert_eq!(env.default_timezone(), "Europe/Paris");
        assert!(ConfigEnv::from_toml_str("[intl").is_err());
        Ok(())
    }

    #[test]
    fn it_pins_defaults() {
        let env = FixedEnv::new("en_US", "UTC");
        assert_eq!(env.default_locale(), "en_US");
        assert_eq!(env.default_timezone(), "UTC");
    }
}
