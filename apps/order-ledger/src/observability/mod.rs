//! Observability module for metrics and logging.
//!
//! This module provides instrumentation for the ledger, including
//! Prometheus metrics export and the tracing subscriber.

mod logging;
mod metrics;

pub use logging::{LoggingError, init_tracing};
pub use metrics::{
    MetricsConfig, MetricsError, init_metrics, record_cycle_duration, record_feed_timeout,
    record_reconcile_failure, record_stale_update, record_submission, record_trades,
    record_transition, update_resting_orders,
};
