//! Unified error types for the exercise tracker.

use std::fmt;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::warn;

use crate::exercise::ObjectId;
use crate::metrics;

/// Top-level error type used by the binary.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration is loaded but not usable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Document store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Metrics exporter could not be installed.
    #[error("metrics error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single schema violation on one document path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Dotted path of the offending field.
    pub path: String,
    /// Human readable message.
    pub message: String,
}

impl FieldError {
    /// A required field was absent or empty.
    pub fn required(path: &str) -> Self {
        Self {
            path: path.to_string(),
            message: format!("Path `{path}` is required."),
        }
    }

    /// A value could not be coerced into the schema type.
    pub fn cast(kind: &str, value: &str, path: &str) -> Self {
        Self {
            path: path.to_string(),
            message: format!("Cast to {kind} failed for value \"{value}\" at path \"{path}\""),
        }
    }
}

/// Schema validation failure. Displays only the first field's message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    /// Build from a non-empty list of field errors.
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// Build from a single field error.
    pub fn single(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// All collected field errors in schema order.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Message of the first failing field.
    pub fn message(&self) -> &str {
        self.errors
            .first()
            .map(|e| e.message.as_str())
            .unwrap_or("Validation failed")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Document store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Document failed schema validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Unique index violation.
    #[error("E11000 duplicate key error index: {field}_1 dup key: {{ {field}: \"{value}\" }}")]
    DuplicateKey {
        /// Indexed field.
        field: &'static str,
        /// Offending value.
        value: String,
    },

    /// Save of a document that was never created.
    #[error("No document found for query {{ _id: {0} }}")]
    DocumentNotFound(ObjectId),

    /// Connection string with an unknown scheme or missing location.
    #[error("unsupported connection string: {0}")]
    UnsupportedUrl(String),

    /// Snapshot file could not be read or written.
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot file is not valid JSON.
    #[error("store snapshot error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by HTTP handlers and the terminal error layer.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Manual request validation failed.
    #[error("{0}")]
    Validation(String),

    /// No user matched the reference.
    #[error("{0}")]
    NotFound(String),

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Request body could not be parsed.
    #[error("{0}")]
    MalformedBody(String),

    /// Unclassified failure.
    #[error("Internal Server Error")]
    Internal,
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Store(StoreError::Validation(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Store(StoreError::Io(_) | StoreError::Json(_)) | ApiError::Internal => {
                tracing::error!(status = %status, "request failed: {}", self);
            }
            _ => warn!(status = %status, "request rejected: {}", self),
        }
        metrics::inc_request_errors();

        plain_text(status, self.to_string())
    }
}

/// Plain-text response with an explicit status.
pub fn plain_text(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
