//! Prometheus metrics
//!
//! Turn counters and latency histograms, exported at `GET /metrics`.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

use crate::ServerError;

pub const REQUESTS_TOTAL: &str = "voice_turn_requests_total";
pub const LATENCY_SECONDS: &str = "voice_turn_latency_seconds";

/// Install the global Prometheus recorder
pub fn init_metrics() -> Result<PrometheusHandle, ServerError> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Metrics(e.to_string()))
}

/// Count a finished turn
pub fn record_request(endpoint: &'static str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!(REQUESTS_TOTAL, "endpoint" => endpoint, "outcome" => outcome).increment(1);
}

/// Record end-to-end turn latency
pub fn record_latency(endpoint: &'static str, elapsed: Duration) {
    metrics::histogram!(LATENCY_SECONDS, "endpoint" => endpoint).record(elapsed.as_secs_f64());
}
