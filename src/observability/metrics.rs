//! Metrics collection and exposition.
//!
//! # Metrics
//! - `logrelay_entries_total` (counter): emitted entries by level
//! - `logrelay_deliveries_total` (counter): delivery outcomes by sink
//! - `logrelay_rotations_total` (counter): active file rotations
//! - `logrelay_queries_total` (counter): retrieval requests by format, status
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels are low-cardinality (level, sink name, outcome, format)

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::entry::Level;

/// Install the Prometheus exporter with an HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_entry(level: Level) {
    counter!("logrelay_entries_total", "level" => level.as_str()).increment(1);
}

pub fn record_delivery(sink: &str, outcome: &'static str) {
    counter!("logrelay_deliveries_total", "sink" => sink.to_string(), "outcome" => outcome).increment(1);
}

pub fn record_rotation() {
    counter!("logrelay_rotations_total").increment(1);
}

pub fn record_query(format: &'static str, status: u16) {
    counter!("logrelay_queries_total", "format" => format, "status" => status.to_string()).increment(1);
}
