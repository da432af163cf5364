//! Metrics collection and exposition.
//!
//! # Metrics
//! - `color_requests_total` (counter): responses sent, by content
//! - `color_request_duration_seconds` (histogram): read-to-response latency
//! - `color_fetch_failures_total` (counter): image fetch/decode failures
//! - `color_aborted_connections_total` (counter): connections closed without a response, by reason

use ::metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Start the Prometheus scrape endpoint. Failure is logged, not fatal.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

pub fn record_response(content: &str, started: Instant) {
    counter!("color_requests_total", "content" => content.to_string()).increment(1);
    histogram!("color_request_duration_seconds").record(started.elapsed().as_secs_f64());
}

pub fn record_fetch_failure() {
    counter!("color_fetch_failures_total").increment(1);
}

pub fn record_aborted(reason: &'static str) {
    counter!("color_aborted_connections_total", "reason" => reason).increment(1);
}
