//! Exercise tracking domain.
//!
//! This module handles:
//! - User and exercise documents
//! - Schema coercion and validation of request fields
//! - Log filtering by date range and count

pub mod log;
pub mod schema;
pub mod types;

pub use log::{LogFilter, LogQuery};
pub use schema::{ExerciseDraft, FieldValue};
pub use types::{Exercise, ObjectId, User, UserLog, UserSummary};
