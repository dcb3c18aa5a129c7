//! Prometheus metrics for the ledger.
//!
//! Without an installed recorder every helper is a no-op, so the library
//! and its tests never need the exporter.
//!
//! # Example
//!
//! ```ignore
//! use order_ledger::observability::{init_metrics, MetricsConfig};
//!
//! init_metrics(&MetricsConfig::with_port(9090))?;
//! record_transition("partial_fill");
//! ```

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
    /// Histogram buckets for cycle latency (in seconds).
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self::with_port(9090)
    }
}

impl MetricsConfig {
    /// Listen on all interfaces at `port`.
    #[must_use]
    pub fn with_port(port: u16) -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            // Latency buckets from 100us to 1s
            latency_buckets: vec![
                0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
            ],
        }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`.
///
/// # Errors
///
/// Returns an error if the metrics exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.latency_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Ledger Metrics
// ============================================================================

/// Record an applied lifecycle transition.
///
/// # Arguments
///
/// * `transition` - Classification label (e.g., "new", "partial_fill")
pub fn record_transition(transition: &'static str) {
    counter!("ledger_transitions_total", "transition" => transition).increment(1);
}

/// Record trades seen while applying one update.
pub fn record_trades(inserted: usize, replayed: usize) {
    if inserted > 0 {
        counter!("ledger_trades_total", "result" => "inserted").increment(inserted as u64);
    }
    if replayed > 0 {
        counter!("ledger_trades_total", "result" => "replayed").increment(replayed as u64);
    }
}

/// Record an update that arrived after a later state was already recorded.
pub fn record_stale_update() {
    counter!("ledger_stale_updates_total").increment(1);
}

/// Record a failed event.
///
/// # Arguments
///
/// * `kind` - Error kind label from `ReconcileError::kind`
pub fn record_reconcile_failure(kind: &'static str) {
    counter!("ledger_event_failures_total", "kind" => kind).increment(1);
}

// ============================================================================
// Loop Metrics
// ============================================================================

/// Record a feed wait that hit its deadline.
pub fn record_feed_timeout() {
    counter!("feed_timeouts_total").increment(1);
}

/// Record an order submission.
///
/// # Arguments
///
/// * `status` - Submission status (e.g., "submitted", "rejected", "error")
pub fn record_submission(status: &'static str) {
    counter!("order_submissions_total", "status" => status).increment(1);
}

/// Update the resting order gauge.
pub fn update_resting_orders(count: usize) {
    gauge!("ledger_resting_orders").set(count as f64);
}

/// Record the wall time spent processing one cycle.
pub fn record_cycle_duration(seconds: f64) {
    histogram!("reconcile_cycle_seconds").record(seconds);
}
