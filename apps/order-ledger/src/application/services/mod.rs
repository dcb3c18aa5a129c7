//! Application Services
//!
//! Services that coordinate multiple use cases or run continuously.

mod depth_tracker;
mod reconciliation_loop;
mod trade_deduplicator;

pub use depth_tracker::DepthTracker;
pub use reconciliation_loop::{
    CycleContext, CycleReport, CycleStatus, FailedEvent, LoopSettings, LoopSummary,
    ReconciliationLoop,
};
pub use trade_deduplicator::TradeDeduplicator;
