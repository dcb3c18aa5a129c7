//! Ledger Observer Port
//!
//! Interface the ledger reports committed lifecycle changes to. Used for
//! logging and audit; reconciliation never depends on observer side effects.

use crate::domain::market::PositionState;
use crate::domain::order_ledger::OrderRecord;
use crate::domain::shared::{Price, Timestamp, TradeId};

/// Periodic view of the market emitted once per in-session quote change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// Feed time.
    pub at: Timestamp,
    /// Best bid.
    pub best_bid: Price,
    /// Best ask.
    pub best_ask: Price,
    /// Venue position.
    pub position: PositionState,
}

/// Port for lifecycle notifications.
pub trait LedgerObserver: Send + Sync {
    /// The venue acknowledged an order.
    fn on_accepted(&self, order: &OrderRecord);

    /// A new fill was recorded.
    fn on_filled(&self, order: &OrderRecord, trade_id: &TradeId);

    /// An order was cancelled.
    fn on_cancelled(&self, order: &OrderRecord);

    /// Periodic market snapshot.
    fn on_status(&self, snapshot: &StatusSnapshot);
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl LedgerObserver for NoOpObserver {
    fn on_accepted(&self, _order: &OrderRecord) {}

    fn on_filled(&self, _order: &OrderRecord, _trade_id: &TradeId) {}

    fn on_cancelled(&self, _order: &OrderRecord) {}

    fn on_status(&self, _snapshot: &StatusSnapshot) {}
}
