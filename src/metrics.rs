//! Prometheus metrics for request latency and tracker activity.
//!
//! This module provides:
//! - Per-endpoint HTTP request latency
//! - Counters for created users, added exercises and log reads
//! - A counter for failed requests

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use tracing::{debug, info};

// === Metric Name Constants ===

/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";
/// Users created counter metric name.
pub const METRIC_USERS_CREATED: &str = "users_created_total";
/// Exercises added counter metric name.
pub const METRIC_EXERCISES_ADDED: &str = "exercises_added_total";
/// Log requests counter metric name.
pub const METRIC_LOG_REQUESTS: &str = "log_requests_total";
/// Request errors counter metric name.
pub const METRIC_REQUEST_ERRORS: &str = "request_errors_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request latency in milliseconds"
    );

    describe_counter!(METRIC_USERS_CREATED, "Total number of users created");
    describe_counter!(METRIC_EXERCISES_ADDED, "Total number of exercises logged");
    describe_counter!(METRIC_LOG_REQUESTS, "Total number of exercise log reads");
    describe_counter!(
        METRIC_REQUEST_ERRORS,
        "Total number of requests answered with an error"
    );

    debug!("Metrics initialized");
}

/// Install the Prometheus exporter, serving scrapes on `addr`.
pub fn install_exporter(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    info!("Metrics exporter listening on {}", addr);
    Ok(())
}

/// Increment users created counter.
pub fn inc_users_created() {
    counter!(METRIC_USERS_CREATED).increment(1);
}

/// Increment exercises added counter.
pub fn inc_exercises_added() {
    counter!(METRIC_EXERCISES_ADDED).increment(1);
}

/// Increment log requests counter.
pub fn inc_log_requests() {
    counter!(METRIC_LOG_REQUESTS).increment(1);
}

/// Increment request errors counter.
pub fn inc_request_errors() {
    counter!(METRIC_REQUEST_ERRORS).increment(1);
}

/// RAII guard for timing a request.
/// Records latency, labelled with the endpoint, when dropped.
pub struct LatencyTimer {
    start: Instant,
    endpoint: &'static str,
}

impl LatencyTimer {
    /// Start timing `endpoint`.
    pub fn new(endpoint: &'static str) -> Self {
        Self {
            start: Instant::now(),
            endpoint,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        histogram!(METRIC_HTTP_REQUEST_LATENCY, "endpoint" => self.endpoint).record(self.elapsed_ms());
    }
}

/// Create a latency timer for an HTTP endpoint.
pub fn timer_http(endpoint: &'static str) -> LatencyTimer {
    LatencyTimer::new(endpoint)
}
