//! Generic validator and the date time validation rule.
use crate::{Map, SharedString, error::Error, extension::JsonObjectExt};
use smallvec::SmallVec;
use std::fmt;

mod validator;

pub use validator::{DateTimeValidator, Validator};

/// A record of validation results.
#[derive(Debug, Default)]
pub struct Validation {
    failed_entries: SmallVec<[(SharedString, Error); 4]>,
}

impl Validation {
    /// Creates a new instance.
    #[inline]
    pub fn new() -> Self {
        Self {
            failed_entries: SmallVec::new(),
        }
    }

    /// Records an entry with the supplied message.
    #[inline]
    pub fn record(&mut self, key: impl Into<SharedString>, message: impl Into<SharedString>) {
        self.failed_entries.push((key.into(), Error::new(message)));
    }

    /// Records an entry for the error.
    #[inline]
    pub fn record_fail(&mut self, key: impl Into<SharedString>, err: impl Into<Error>) {
        self.failed_entries.push((key.into(), err.into()));
    }

    /// Returns `true` if the validation is success.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.failed_entries.is_empty()
    }

    /// Returns the error codes in the order they were recorded.
    #[inline]
    pub fn invalid_params(&self) -> Vec<&str> {
        self.failed_entries
            .iter()
            .map(|entry| entry.0.as_ref())
            .collect()
    }

    /// Returns the error recorded for the key.
    pub fn get(&self, key: &str) -> Option<&Error> {
        self.failed_entries
            .iter()
            .find_map(|(field, err)| (field == key).then_some(err))
    }

    /// Returns the message recorded for the key.
    #[inline]
    pub fn message(&self, key: &str) -> Option<&str> {
        self.get(key).map(|err| err.message())
    }

    /// Removes all recorded entries.
    #[inline]
    pub fn clear(&mut self) {
        self.failed_entries.clear();
    }

    /// Returns the recorded entries as a json object.
    pub fn to_map(&self) -> Map {
        let mut map = Map::new();
        for (key, err) in &self.failed_entries {
            map.upsert(key.as_ref(), err.message());
        }
        map
    }
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, (code, err)) in self.failed_entries.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "invalid value for `{code}`: {}", err.message())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Validation;
    use crate::error::Error;

    #[test]
    fn it_records_failures() {
        let mut validation = Validation::new();
        assert!(validation.is_success());

        validation.record("datetimeInvalid", "Invalid type given. String expected");
        validation.record_fail(
            "datetimeInvalidDateTime",
            Error::with_source("not a date", Error::new("trailing input at position 21")),
        );
        assert!(!validation.is_success());
        assert_eq!(
            validation.invalid_params(),
            ["datetimeInvalid", "datetimeInvalidDateTime"]
        );
        assert_eq!(
            validation.message("datetimeInvalidDateTime"),
            Some("not a date")
        );
        assert_eq!(
            validation
                .get("datetimeInvalidDateTime")
                .and_then(|err| err.source())
                .map(|err| err.message()),
            Some("trailing input at position 21")
        );
        assert_eq!(
            validation.to_string(),
            "invalid value for `datetimeInvalid`: Invalid type given. String expected,\
                invalid value for `datetimeInvalidDateTime`: not a date"
        );

        let map = validation.to_map();
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get("datetimeInvalid").and_then(|v| v.as_str()),
            Some("Invalid type given. String expected")
        );
        validation.clear();
        assert!(validation.is_success());
        assert!(validation.get("datetimeInvalid").is_none());
    }
}
