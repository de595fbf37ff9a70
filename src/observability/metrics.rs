//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_requests_total` (counter): admission decisions by decision, state
//! - `gate_refresh_total` (counter): refresh cycles by outcome
//! - `gate_refresh_duration_seconds` (histogram): fetch latency
//! - `gate_status` (gauge): 0=OK, 1=SOFT_LOCK, 2=HARD_LOCK
//! - `gate_status_transitions_total` (counter): committed changes by from, to
//!
//! Without an installed recorder every call is a no-op.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

use crate::status::Status;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one admission decision.
pub fn record_decision(allowed: bool, status: Status) {
    let decision = if allowed { "allow" } else { "deny" };
    counter!("gate_requests_total", "decision" => decision, "state" => status.as_str()).increment(1);
}

/// Record a finished refresh cycle.
pub fn record_refresh(outcome: &'static str, started: Instant) {
    counter!("gate_refresh_total", "outcome" => outcome).increment(1);
    histogram!("gate_refresh_duration_seconds").record(started.elapsed().as_secs_f64());
}

/// Record the committed status.
pub fn record_status(status: Status) {
    gauge!("gate_status").set(status as u8 as f64);
}

/// Record a committed status change.
pub fn record_transition(from: Status, to: Status) {
    counter!("gate_status_transitions_total", "from" => from.as_str(), "to" => to.as_str()).increment(1);
}
