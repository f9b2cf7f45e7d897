//! User and exercise documents.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

/// Random bytes fixed for the lifetime of the process.
static PROCESS_UNIQUE: Lazy<[u8; 5]> = Lazy::new(|| {
    let bytes = uuid::Uuid::new_v4().into_bytes();
    [bytes[0], bytes[1], bytes[2], bytes[3], bytes[4]]
});

/// Per-process counter, seeded randomly.
static COUNTER: Lazy<AtomicU32> = Lazy::new(|| {
    let bytes = uuid::Uuid::new_v4().into_bytes();
    AtomicU32::new(u32::from_be_bytes([0, bytes[5], bytes[6], bytes[7]]))
});

/// Opaque 12-byte document identifier, rendered as 24 hex characters.
///
/// Layout: 4-byte big-endian creation timestamp (seconds), 5 process-unique
/// random bytes, 3-byte big-endian counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

/// Returned when a string is not a 24-character hex identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid object id: {0}")]
pub struct InvalidObjectId(pub String);

impl ObjectId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Generate an identifier whose timestamp part is `time`.
    pub fn at(time: DateTime<Utc>) -> Self {
        let seconds = time.timestamp().clamp(0, i64::from(u32::MAX)) as u32;
        let count = COUNTER.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_UNIQUE);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Parse the 24-character hex form. Returns `None` for anything else.
    pub fn parse_str(value: &str) -> Option<Self> {
        if value.len() != 24 {
            return None;
        }
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(value, &mut bytes).ok()?;
        Some(Self(bytes))
    }

    /// Creation time embedded in the identifier.
    pub fn timestamp(&self) -> DateTime<Utc> {
        let seconds = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        DateTime::from_timestamp(i64::from(seconds), 0).unwrap_or_default()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for ObjectId {
    type Err = InvalidObjectId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s).ok_or_else(|| InvalidObjectId(s.to_string()))
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// One logged activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Exercise {
    /// Store-assigned identifier.
    #[serde(rename = "_id")]
    #[schema(value_type = String)]
    pub id: ObjectId,
    /// What was done.
    pub description: String,
    /// How long it took.
    #[serde(serialize_with = "serialize_number")]
    pub duration: f64,
    /// When it happened.
    #[serde(with = "iso_date")]
    #[schema(value_type = String, format = DateTime)]
    pub date: DateTime<Utc>,
}

/// A tracked person and their exercises in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Store-assigned identifier.
    #[serde(rename = "_id")]
    #[schema(value_type = String)]
    pub id: ObjectId,
    /// Unique username.
    pub username: String,
    /// Logged exercises, oldest append first.
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

impl User {
    /// New user with no exercises.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            username: username.into(),
            exercises: Vec::new(),
        }
    }

    /// Append an exercise to the end of the log.
    pub fn append_exercise(&mut self, exercise: Exercise) {
        self.exercises.push(exercise);
    }
}

/// User as returned by the listing endpoint: no exercises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    /// Store-assigned identifier.
    #[serde(rename = "_id")]
    #[schema(value_type = String)]
    pub id: ObjectId,
    /// Unique username.
    pub username: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// User as returned by the log endpoint: exercises replaced by `log`/`count`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserLog {
    /// Store-assigned identifier.
    #[serde(rename = "_id")]
    #[schema(value_type = String)]
    pub id: ObjectId,
    /// Unique username.
    pub username: String,
    /// Filtered exercises.
    pub log: Vec<Exercise>,
    /// Length of `log`.
    pub count: usize,
}

impl UserLog {
    /// Build the log view of `user` from an already-filtered exercise list.
    pub fn new(user: User, log: Vec<Exercise>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            count: log.len(),
            log,
        }
    }
}

/// Integral values render as JSON integers, everything else as floats.
fn serialize_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// ISO-8601 UTC with millisecond precision.
mod iso_date {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let value = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&value)
            .map(|d| d.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
