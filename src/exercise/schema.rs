//! Schema-level coercion and validation for exercise documents.
//!
//! Request bodies arrive either as URL-encoded forms (every value a string)
//! or as JSON (numbers may be real numbers). Values are coerced the way a
//! document store would: numeric strings become numbers, date strings become
//! UTC timestamps, and empty strings count as missing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use super::types::{Exercise, ObjectId};
use crate::error::{FieldError, ValidationError};

/// A scalar body value that may arrive as a number or as text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// JSON number.
    Number(f64),
    /// Form value or JSON string.
    Text(String),
}

impl FieldValue {
    fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(text) if text.trim().is_empty())
    }
}

/// Coerce a value to a number, or report a cast failure at `path`.
pub fn cast_number(value: &FieldValue, path: &str) -> Result<f64, FieldError> {
    match value {
        FieldValue::Number(n) => Ok(*n),
        FieldValue::Text(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| FieldError::cast("Number", text, path)),
    }
}

/// Coerce a string to a UTC date, or report a cast failure at `path`.
///
/// Accepted forms: RFC 3339, `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS[.fff]]`
/// (read as UTC) and `YYYY-MM`.
pub fn cast_date(value: &str, path: &str) -> Result<DateTime<Utc>, FieldError> {
    parse_date(value).ok_or_else(|| FieldError::cast("Date", value, path))
}

/// Parse the accepted date forms.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|d| d.and_utc());
    }

    NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
}

/// Unvalidated exercise fields as received from a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExerciseDraft {
    /// Free-text description.
    pub description: Option<String>,
    /// Duration, number or numeric text.
    pub duration: Option<FieldValue>,
    /// Date text; blank or absent means "now".
    pub date: Option<String>,
}

impl ExerciseDraft {
    /// Validate every field and build the exercise.
    ///
    /// `now` stamps the exercise when no date was supplied. All field errors
    /// are collected in schema order (description, duration, date).
    pub fn validate(self, now: DateTime<Utc>) -> Result<Exercise, ValidationError> {
        let mut errors = Vec::new();

        let description = match self.description {
            Some(text) if !text.is_empty() => Some(text),
            _ => {
                errors.push(FieldError::required("description"));
                None
            }
        };

        let duration = match self.duration.filter(|v| !v.is_blank()) {
            Some(value) => match cast_number(&value, "duration") {
                Ok(n) => Some(n),
                Err(e) => {
                    errors.push(e);
                    None
                }
            },
            None => {
                errors.push(FieldError::required("duration"));
                None
            }
        };

        let date = match self.date.filter(|d| !d.trim().is_empty()) {
            Some(text) => match cast_date(&text, "date") {
                Ok(d) => Some(d),
                Err(e) => {
                    errors.push(e);
                    None
                }
            },
            None => Some(now),
        };

        match (description, duration, date) {
            (Some(description), Some(duration), Some(date)) if errors.is_empty() => Ok(Exercise {
                id: ObjectId::new(),
                description,
                duration,
                date,
            }),
            _ => Err(ValidationError::new(errors)),
        }
    }
}

/// Validate a username for insertion.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::single(FieldError::required("username")));
    }
    Ok(())
}
