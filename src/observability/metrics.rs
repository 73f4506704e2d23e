//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, status
//! - `http_request_duration_seconds` (histogram): latency distribution
//! - `http_tracing_decisions_total` (counter): inbound trace/skip decisions
//! - `trace_relay_total` (counter): client trace relays by outcome
//! - `theme_store_size` (gauge): entries in the theme store
//!
//! # Design Decisions
//! - Metric updates are no-ops until a recorder is installed
//! - Prometheus listener is optional (`observability.metrics_enabled`)

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint. Requires a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

/// `decision` is `traced` or `skipped`.
pub fn record_trace_decision(decision: &'static str) {
    counter!("http_tracing_decisions_total", "decision" => decision).increment(1);
}

/// `outcome` is `success` or `failure`.
pub fn record_trace_relay(outcome: &'static str) {
    counter!("trace_relay_total", "outcome" => outcome).increment(1);
}

pub fn record_store_size(size: usize) {
    gauge!("theme_store_size").set(size as f64);
}
