use super::{DateTimeStyle, FormatterError};
use unic_langid::LanguageIdentifier;

/// Default pattern when neither a date style nor a time style is requested.
const FALLBACK_PATTERN: &str = "yyyyMMdd hh:mm a";

/// Calendar symbols and style patterns of a locale.
///
/// Style patterns are indexed as `[full, long, medium, short]`.
/// Weekdays start with Sunday.
#[derive(Debug, PartialEq, Eq)]
pub struct LocaleData {
    /// Name of the locale data.
    name: &'static str,
    /// Wide month names.
    months: [&'static str; 12],
    /// Abbreviated month names.
    months_abbr: [&'static str; 12],
    /// Wide weekday names.
    weekdays: [&'static str; 7],
    /// Abbreviated weekday names.
    weekdays_abbr: [&'static str; 7],
    /// Abbreviated eras, BC first.
    eras: [&'static str; 2],
    /// AM and PM markers.
    day_periods: [&'static str; 2],
    /// Date patterns.
    date_patterns: [&'static str; 4],
    /// Time patterns.
    time_patterns: [&'static str; 4],
    /// Glue patterns joining a date `{1}` and a time `{0}`, selected by the date style.
    datetime_patterns: [&'static str; 4],
}

impl LocaleData {
    /// Resolves the locale data for a language identifier.
    ///
    /// Languages without data fall back to English.
    pub fn resolve(langid: &LanguageIdentifier) -> &'static Self {
        let region = langid.region.as_ref().map(|region| region.as_str());
        match langid.language.as_str() {
            "en" if matches!(region, Some("GB" | "IE" | "AU" | "NZ")) => &EN_GB,
            "en" => &EN,
            "de" => &DE,
            "fr" => &FR,
            "es" => &ES,
            "zh" => &ZH,
            language => {
                tracing::warn!(
                    locale = %langid,
                    "no calendar data for the language `{language}`, falling back to `en`"
                );
                &EN
            }
        }
    }

    /// Returns the name of the locale data.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the wide month names, January first.
    #[inline]
    pub fn months(&self) -> &[&'static str; 12] {
        &self.months
    }

    /// Returns the abbreviated month names, January first.
    #[inline]
    pub fn months_abbr(&self) -> &[&'static str; 12] {
        &self.months_abbr
    }

    /// Returns the wide weekday names, Sunday first.
    #[inline]
    pub fn weekdays(&self) -> &[&'static str; 7] {
        &self.weekdays
    }

    /// Returns the abbreviated weekday names, Sunday first.
    #[inline]
    pub fn weekdays_abbr(&self) -> &[&'static str; 7] {
        &self.weekdays_abbr
    }

    /// Returns the abbreviated eras, BC first.
    #[inline]
    pub fn eras(&self) -> &[&'static str; 2] {
        &self.eras
    }

    /// Returns the AM and PM markers.
    #[inline]
    pub fn day_periods(&self) -> &[&'static str; 2] {
        &self.day_periods
    }

    /// Returns the date pattern of a style.
    pub fn date_pattern(&self, style: DateTimeStyle) -> Option<&'static str> {
        style_index(style).map(|index| self.date_patterns[index])
    }

    /// Returns the time pattern of a style.
    pub fn time_pattern(&self, style: DateTimeStyle) -> Option<&'static str> {
        style_index(style).map(|index| self.time_patterns[index])
    }

    /// Builds the pattern for a combination of date and time styles.
    pub fn style_pattern(&self, date_style: DateTimeStyle, time_style: DateTimeStyle) -> String {
        match (self.date_pattern(date_style), self.time_pattern(time_style)) {
            (Some(date), Some(time)) => {
                let glue = style_index(date_style)
                    .map(|index| self.datetime_patterns[index])
                    .unwrap_or("{1} {0}");
                glue.replace("{1}", date).replace("{0}", time)
            }
            (Some(date), None) => date.to_owned(),
            (None, Some(time)) => time.to_owned(),
            (None, None) => FALLBACK_PATTERN.to_owned(),
        }
    }
}

/// Parses a locale identifier.
///
/// Underscores, POSIX codesets (`.UTF-8`) and ICU keywords (`@calendar=...`)
/// are accepted.
pub(crate) fn parse_locale(locale: &str) -> Result<LanguageIdentifier, FormatterError> {
    let tag = locale.split(['.', '@']).next().unwrap_or_default().trim();
    if tag.is_empty() {
        return Err(FormatterError::InvalidLocale(locale.to_owned()));
    }
    tag.parse::<LanguageIdentifier>()
        .map_err(|_| FormatterError::InvalidLocale(locale.to_owned()))
}

/// Returns the index of a style in the pattern tables.
fn style_index(style: DateTimeStyle) -> Option<usize> {
    match style {
        DateTimeStyle::None => None,
        DateTimeStyle::Full => Some(0),
        DateTimeStyle::Long => Some(1),
        DateTimeStyle::Medium => Some(2),
        DateTimeStyle::Short => Some(3),
    }
}

const ENGLISH: LocaleData = LocaleData {
    name: "en",
    months: [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ],
    months_abbr: [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ],
    weekdays: [
        "Sunday",
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
    ],
    weekdays_abbr: ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
    eras: ["BC", "AD"],
    day_periods: ["AM", "PM"],
    date_patterns: ["EEEE, MMMM d, y", "MMMM d, y", "MMM d, y", "M/d/yy"],
    time_patterns: ["h:mm:ss a zzzz", "h:mm:ss a z", "h:mm:ss a", "h:mm a"],
    datetime_patterns: ["{1} 'at' {0}", "{1} 'at' {0}", "{1}, {0}", "{1}, {0}"],
};

static EN: LocaleData = ENGLISH;

static EN_GB: LocaleData = LocaleData {
    name: "en-GB",
    date_patterns: ["EEEE, d MMMM y", "d MMMM y", "d MMM y", "dd/MM/y"],
    time_patterns: ["HH:mm:ss zzzz", "HH:mm:ss z", "HH:mm:ss", "HH:mm"],
    ..ENGLISH
};

static DE: LocaleData = LocaleData {
    name: "de",
    months: [
        "Januar",
        "Februar",
        "März",
        "April",
        "Mai",
        "Juni",
        "Juli",
        "August",
        "September",
        "Oktober",
        "November",
        "Dezember",
    ],
    months_abbr: [
        "Jan.", "Feb.", "März", "Apr.", "Mai", "Juni", "Juli", "Aug.", "Sept.", "Okt.", "Nov.",
        "Dez.",
    ],
    weekdays: [
        "Sonntag",
        "Montag",
        "Dienstag",
        "Mittwoch",
        "Donnerstag",
        "Freitag",
        "Samstag",
    ],
    weekdays_abbr: ["So.", "Mo.", "Di.", "Mi.", "Do.", "Fr.", "Sa."],
    eras: ["v. Chr.", "n. Chr."],
    day_periods: ["AM", "PM"],
    date_patterns: ["EEEE, d. MMMM y", "d. MMMM y", "dd.MM.y", "dd.MM.yy"],
    time_patterns: ["HH:mm:ss zzzz", "HH:mm:ss z", "HH:mm:ss", "HH:mm"],
    datetime_patterns: ["{1} 'um' {0}", "{1} 'um' {0}", "{1}, {0}", "{1}, {0}"],
};

static FR: LocaleData = LocaleData {
    name: "fr",
    months: [
        "janvier",
        "février",
        "mars",
        "avril",
        "mai",
        "juin",
        "juillet",
        "août",
        "septembre",
        "octobre",
        "novembre",
        "décembre",
    ],
    months_abbr: [
        "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.",
        "nov.", "déc.",
    ],
    weekdays: [
        "dimanche", "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi",
    ],
    weekdays_abbr: ["dim.", "lun.", "mar.", "mer.", "jeu.", "ven.", "sam."],
    eras: ["av. J.-C.", "ap. J.-C."],
    day_periods: ["AM", "PM"],
    date_patterns: ["EEEE d MMMM y", "d MMMM y", "d MMM y", "dd/MM/y"],
    time_patterns: ["HH:mm:ss zzzz", "HH:mm:ss z", "HH:mm:ss", "HH:mm"],
    datetime_patterns: ["{1} 'à' {0}", "{1} 'à' {0}", "{1} {0}", "{1} {0}"],
};

static ES: LocaleData = LocaleData {
    name: "es",
    months: [
        "enero",
        "febrero",
        "marzo",
        "abril",
        "mayo",
        "junio",
        "julio",
        "agosto",
        "septiembre",
        "octubre",
        "noviembre",
        "diciembre",
    ],
    months_abbr: [
        "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
    ],
    weekdays: [
        "domingo",
        "lunes",
        "martes",
        "miércoles",
        "jueves",
        "viernes",
        "sábado",
    ],
    weekdays_abbr: ["dom", "lun", "mar", "mié", "jue", "vie", "sáb"],
    eras: ["a. C.", "d. C."],
    day_periods: ["a. m.", "p. m."],
    date_patterns: [
        "EEEE, d 'de' MMMM 'de' y",
        "d 'de' MMMM 'de' y",
        "d MMM y",
        "d/M/yy",
    ],
    time_patterns: ["H:mm:ss (zzzz)", "H:mm:ss z", "H:mm:ss", "H:mm"],
    datetime_patterns: ["{1}, {0}", "{1}, {0}", "{1}, {0}", "{1}, {0}"],
};

static ZH: LocaleData = LocaleData {
    name: "zh",
    months: [
        "一月", "二月", "三月", "四月", "五月", "六月", "七月", "八月", "九月", "十月", "十一月",
        "十二月",
    ],
    months_abbr: [
        "1月", "2月", "3月", "4月", "5月", "6月", "7月", "8月", "9月", "10月", "11月", "12月",
    ],
    weekdays: [
        "星期日", "星期一", "星期二", "星期三", "星期四", "星期五", "星期六",
    ],
    weekdays_abbr: ["周日", "周一", "周二", "周三", "周四", "周五", "周六"],
    eras: ["公元前", "公元"],
    day_periods: ["上午", "下午"],
    date_patterns: ["y年M月d日EEEE", "y年M月d日", "y年M月d日", "y/M/d"],
    time_patterns: ["zzzz HH:mm:ss", "z HH:mm:ss", "HH:mm:ss", "HH:mm"],
    datetime_patterns: ["{1} {0}", "{1} {0}", "{1} {0}", "{1} {0}"],
};
