//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define shim metrics (requests, latency, faults)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `shim_requests_total` (counter): requests by method, status, service
//! - `shim_request_duration_seconds` (histogram): latency distribution
//! - `shim_faults_total` (counter): translated errors by kind and status
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Labels for method, service, status code
//! - Recording without an installed exporter is a no-op

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::errors::ErrorKind;

/// Start the Prometheus scrape endpoint. Needs a running tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

/// One finished request. `service` is `"none"` when no route matched.
pub fn record_request(method: &str, status: u16, service: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("service", service.to_string()),
    ];
    metrics::counter!("shim_requests_total", &labels).increment(1);
    metrics::histogram!("shim_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_fault(kind: ErrorKind, status: u16) {
    metrics::counter!(
        "shim_faults_total",
        "kind" => kind.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
