//! Metrics collection and exposition.
//!
//! # Metrics
//! - `trusted_headers_decisions_total` (counter): gate decisions by outcome
//! - `trusted_headers_blacklist_entries` (gauge): size of the live blacklist
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed (tests, `--check`)
//! - Prometheus exporter is optional and bound to its own address

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::gate::GateDecision;

/// Install the Prometheus recorder and scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), metrics_exporter_prometheus::BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Count one gate decision.
pub fn record_decision(decision: GateDecision) {
    metrics::counter!("trusted_headers_decisions_total", "decision" => decision.as_str()).increment(1);
}

/// Track the size of the current host blacklist.
pub fn record_blacklist_size(entries: usize) {
    metrics::gauge!("trusted_headers_blacklist_entries").set(entries as f64);
}
