//! Metrics collection and exposition.
//!
//! # Metrics
//! - `catalog_requests_total` (counter): requests by method, operation, status
//! - `catalog_request_duration_seconds` (histogram): dispatch latency
//!
//! Requests that match no binding are recorded under operation `none`.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one handled request.
pub fn record_request(method: &str, operation: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "catalog_requests_total",
        "method" => method.to_string(),
        "operation" => operation,
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "catalog_request_duration_seconds",
        "method" => method.to_string(),
        "operation" => operation
    )
    .record(start.elapsed().as_secs_f64());
}
