//! Exercise tracking REST API.
//!
//! Records users and the exercises they log, and returns exercise logs
//! filtered by date range and count.
//!
//! # Endpoints
//!
//! ```text
//! POST /api/exercise/new-user       username
//! GET  /api/exercise/users
//! POST /api/exercise/add            userId, description, duration, date?
//! GET  /api/exercise/log/:userid    from?, to?, limit?
//! ```
//!
//! A user reference is either the username or the store-assigned
//! identifier; the username clause is tried first.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`exercise`]: User/exercise documents, validation and log filtering
//! - [`store`]: Document store interface and implementations
//! - [`api`]: HTTP routes and handlers
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod exercise;
pub mod metrics;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
