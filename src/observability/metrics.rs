//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_auth_decisions_total` (counter): gate decisions by kind
//! - `gateway_login_outcomes_total` (counter): login attempts by outcome
//! - `gateway_active_sessions` (gauge): sessions held by the store
//!
//! Recording is a no-op until a recorder is installed, so the functions
//! below are safe to call from tests and when metrics are disabled.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    describe_metrics();
    tracing::info!(address = %addr, "Metrics exporter listening on /metrics");
    Ok(())
}

fn describe_metrics() {
    describe_counter!("gateway_requests_total", "Total HTTP requests handled");
    describe_histogram!(
        "gateway_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "gateway_auth_decisions_total",
        "Security gate decisions by kind"
    );
    describe_counter!(
        "gateway_login_outcomes_total",
        "Login attempts by outcome"
    );
    describe_gauge!("gateway_active_sessions", "Sessions held by the store");
}

/// `status` is `None` when the request was dropped before a response existed.
pub fn record_request(method: &str, status: Option<u16>, start: Instant) {
    let status = status.map_or_else(|| "aborted".to_string(), |s| s.to_string());
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_auth_decision(decision: &'static str) {
    counter!("gateway_auth_decisions_total", "decision" => decision).increment(1);
}

pub fn record_login_outcome(outcome: &'static str) {
    counter!("gateway_login_outcomes_total", "outcome" => outcome).increment(1);
}

pub fn record_session_count(count: usize) {
    gauge!("gateway_active_sessions").set(count as f64);
}
