//! Prometheus metrics for the guestbook API.
//!
//! This module provides metrics for:
//! - HTTP request latency per endpoint
//! - Store query latency per operation and query mode
//! - Created/listed messages, validation rejections, storage errors

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use tracing::{debug, info};

use crate::store::QueryMode;

// === Metric Name Constants ===

/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";
/// Store query latency metric name.
pub const METRIC_STORE_QUERY_LATENCY: &str = "store_query_latency_ms";
/// Messages created counter metric name.
pub const METRIC_MESSAGES_CREATED: &str = "messages_created_total";
/// Message list requests counter metric name.
pub const METRIC_MESSAGES_LISTED: &str = "messages_listed_total";
/// Validation rejections counter metric name.
pub const METRIC_VALIDATION_REJECTIONS: &str = "validation_rejections_total";
/// Storage errors counter metric name.
pub const METRIC_STORAGE_ERRORS: &str = "storage_errors_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request latency in milliseconds"
    );
    describe_histogram!(
        METRIC_STORE_QUERY_LATENCY,
        "Store query latency in milliseconds"
    );

    describe_counter!(METRIC_MESSAGES_CREATED, "Total number of messages created");
    describe_counter!(
        METRIC_MESSAGES_LISTED,
        "Total number of message list requests served"
    );
    describe_counter!(
        METRIC_VALIDATION_REJECTIONS,
        "Total number of create requests rejected by validation"
    );
    describe_counter!(
        METRIC_STORAGE_ERRORS,
        "Total number of failed store operations"
    );

    debug!("Metrics initialized");
}

/// Install the Prometheus exporter on its own listener.
pub fn install_exporter(port: u16) -> Result<(), BuildError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    info!("Prometheus exporter listening on {}", addr);
    Ok(())
}

/// Record HTTP request latency.
pub fn record_http_latency(start: Instant, endpoint: &'static str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_HTTP_REQUEST_LATENCY, "endpoint" => endpoint).record(latency_ms);
}

/// Record store query latency.
pub fn record_store_latency(start: Instant, op: &'static str, mode: QueryMode) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_STORE_QUERY_LATENCY, "op" => op, "mode" => mode.to_string())
        .record(latency_ms);
}

/// Increment messages created counter.
pub fn inc_messages_created() {
    counter!(METRIC_MESSAGES_CREATED).increment(1);
}

/// Increment message list counter.
pub fn inc_messages_listed() {
    counter!(METRIC_MESSAGES_LISTED).increment(1);
}

/// Increment validation rejections counter.
pub fn inc_validation_rejections() {
    counter!(METRIC_VALIDATION_REJECTIONS).increment(1);
}

/// Increment storage errors counter.
pub fn inc_storage_errors() {
    counter!(METRIC_STORAGE_ERRORS).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    endpoint: &'static str,
}

impl LatencyTimer {
    /// Create a new HTTP latency timer for the given endpoint.
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
        record_http_latency(self.start, self.endpoint);
    }
}
