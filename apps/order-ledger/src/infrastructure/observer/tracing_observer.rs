//! Observer that writes one structured log event per notification.

use crate::application::ports::{LedgerObserver, StatusSnapshot};
use crate::domain::order_ledger::OrderRecord;
use crate::domain::shared::TradeId;

/// Audit log of ledger lifecycle changes.
#[derive(Debug, Clone, Default)]
pub struct TracingObserver {
    instrument: String,
}

impl TracingObserver {
    /// Create an observer that tags every event with `instrument`.
    #[must_use]
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
        }
    }
}

impl LedgerObserver for TracingObserver {
    fn on_accepted(&self, order: &OrderRecord) {
        tracing::info!(
            instrument = %self.instrument,
            order_id = %order.order_id(),
            direction = %order.direction(),
            offset = %order.offset(),
            price = %order.limit_price(),
            volume = order.volume_original(),
            inserted_at = %order.inserted_at(),
            "Order accepted"
        );
    }

    fn on_filled(&self, order: &OrderRecord, trade_id: &TradeId) {
        tracing::info!(
            instrument = %self.instrument,
            order_id = %order.order_id(),
            trade_id = %trade_id,
            direction = %order.direction(),
            offset = %order.offset(),
            status = %order.status(),
            volume_left = order.volume_left(),
            "Order filled"
        );
    }

    fn on_cancelled(&self, order: &OrderRecord) {
        tracing::info!(
            instrument = %self.instrument,
            order_id = %order.order_id(),
            status = %order.status(),
            volume_left = order.volume_left(),
            volume_original = order.volume_original(),
            "Order cancelled"
        );
    }

    fn on_status(&self, snapshot: &StatusSnapshot) {
        tracing::debug!(
            instrument = %self.instrument,
            at = %snapshot.at,
            bid = %snapshot.best_bid,
            ask = %snapshot.best_ask,
            long = snapshot.position.long,
            short = snapshot.position.short,
            "Status"
        );
    }
}
