//! Metrics collection and exposition.
//!
//! # Metrics
//! - `config_mutations_total` (counter): manager mutations by operation, outcome
//! - `config_reloads_total` (counter): reloads from the store by outcome
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Prometheus exporter is optional and only started by the binary

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Count one mutation attempt. `outcome` is `ok` or an error kind.
pub fn record_mutation(operation: &'static str, outcome: &'static str) {
    metrics::counter!(
        "config_mutations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_reload(outcome: &'static str) {
    metrics::counter!("config_reloads_total", "outcome" => outcome).increment(1);
}

/// Start the Prometheus scrape endpoint. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}
