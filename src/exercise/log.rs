//! Date-range and count filtering of a user's exercise log.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

use super::schema::parse_date;
use super::types::Exercise;

/// Raw log query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LogQuery {
    /// Inclusive lower date bound.
    pub from: Option<String>,
    /// Inclusive upper date bound.
    pub to: Option<String>,
    /// Maximum number of entries, taken in stored order.
    pub limit: Option<String>,
}

/// One end of a date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// A parsed instant.
    At(DateTime<Utc>),
    /// Text that is not a date. No exercise compares against it, so it
    /// matches nothing.
    Unparseable,
}

impl Bound {
    fn parse(value: &str) -> Self {
        parse_date(value).map_or(Bound::Unparseable, Bound::At)
    }
}

/// Parsed log filter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LogFilter {
    /// Keep exercises dated on or after this bound.
    pub from: Option<Bound>,
    /// Keep exercises dated on or before this bound.
    pub to: Option<Bound>,
    /// Slice end, already converted to a number (`NaN` when not numeric).
    pub limit: Option<f64>,
}

impl From<LogQuery> for LogFilter {
    fn from(query: LogQuery) -> Self {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        Self {
            from: present(query.from).map(|v| Bound::parse(&v)),
            to: present(query.to).map(|v| Bound::parse(&v)),
            limit: present(query.limit).map(|v| to_number(&v)),
        }
    }
}

/// Numeric conversion of query text: decimal or exponent notation and
/// `Infinity`; anything else is `NaN`.
pub fn to_number(text: &str) -> f64 {
    let text = text.trim();
    match text {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if text.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }
    text.parse::<f64>().unwrap_or(f64::NAN)
}

/// End index for taking the first `limit` of `len` entries. Fractions
/// truncate toward zero, `NaN` is 0 and negatives count back from the end.
pub fn slice_end(limit: f64, len: usize) -> usize {
    if limit.is_nan() {
        return 0;
    }
    let len_f = len as f64;
    let n = limit.trunc();
    if n < 0.0 {
        (len_f + n).max(0.0) as usize
    } else {
        n.min(len_f) as usize
    }
}

impl LogFilter {
    /// Whether `exercise` falls inside both present date bounds.
    pub fn matches(&self, exercise: &Exercise) -> bool {
        let after_from = match self.from {
            None => true,
            Some(Bound::At(from)) => exercise.date >= from,
            Some(Bound::Unparseable) => false,
        };
        let before_to = match self.to {
            None => true,
            Some(Bound::At(to)) => exercise.date <= to,
            Some(Bound::Unparseable) => false,
        };
        after_from && before_to
    }

    /// Filter by date bounds, then truncate to `limit` in stored order.
    pub fn apply(&self, exercises: &[Exercise]) -> Vec<Exercise> {
        let mut log: Vec<Exercise> = exercises
            .iter()
            .filter(|e| self.matches(e))
            .cloned()
            .collect();
        if let Some(limit) = self.limit {
            log.truncate(slice_end(limit, log.len()));
        }
        log
    }
}
