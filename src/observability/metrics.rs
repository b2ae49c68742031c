//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_admission_rejections_total` (counter): ceiling rejections
//! - `gateway_allowlist_misses_total` (counter): unrecognized credentials
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Labels carry only low-cardinality values; never credentials or paths
//! - Exporter endpoint is optional and bound separately from the proxy

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one completed (or locally answered) request.
pub fn record_request(method: &str, status: u16, start_time: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds").record(start_time.elapsed().as_secs_f64());
}

/// Record a request rejected by the admission ceiling.
pub fn record_admission_rejected() {
    counter!("gateway_admission_rejections_total").increment(1);
}

/// Record a presented credential with no allow-list match.
pub fn record_allowlist_miss() {
    counter!("gateway_allowlist_misses_total").increment(1);
}
