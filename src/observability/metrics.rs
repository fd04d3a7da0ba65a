//! Metrics collection and exposition.
//!
//! # Metrics
//! - `keeper_draw_attempts_total` (counter): draw attempts by trigger (scheduler, manual)
//! - `keeper_transactions_total` (counter): submitted transactions by kind and outcome
//! - `keeper_confirmation_polls_total` (counter): status polls by observed status
//! - `keeper_scheduler_errors_total` (counter): failed scheduler ticks
//! - `keeper_running` (gauge): 1 while the service is started
//!
//! Without an installed recorder every call is a no-op.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus recorder and its HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count a draw attempt.
pub fn record_draw_attempt(trigger: &'static str) {
    counter!("keeper_draw_attempts_total", "trigger" => trigger).increment(1);
}

/// Count a transaction that reached a terminal local outcome.
pub fn record_transaction(kind: &'static str, outcome: &'static str) {
    counter!("keeper_transactions_total", "kind" => kind, "outcome" => outcome).increment(1);
}

/// Count a single status poll.
pub fn record_confirmation_poll(status: &'static str) {
    counter!("keeper_confirmation_polls_total", "status" => status).increment(1);
}

/// Count a scheduler tick that ended in an error.
pub fn record_scheduler_error() {
    counter!("keeper_scheduler_errors_total").increment(1);
}

/// Reflect the service running flag.
pub fn set_running(running: bool) {
    gauge!("keeper_running").set(if running { 1.0 } else { 0.0 });
}
