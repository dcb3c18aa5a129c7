//! Ledger Notifications
//!
//! Lifecycle notifications collected while an update is applied and
//! dispatched to the observer only after the enclosing transaction commits.

use super::aggregate::OrderRecord;
use crate::domain::shared::TradeId;

/// A committed change to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerNotification {
    /// The venue acknowledged the order (possibly inferred from a fill).
    Accepted(OrderRecord),
    /// A new fill was recorded against the order.
    Filled {
        /// Order state after the fill was applied.
        order: OrderRecord,
        /// The recorded fill.
        trade_id: TradeId,
    },
    /// The order was cancelled, fully or after partial fills.
    Cancelled(OrderRecord),
}

impl LedgerNotification {
    /// The order this notification is about.
    #[must_use]
    pub const fn order(&self) -> &OrderRecord {
        match self {
            Self::Accepted(order) | Self::Cancelled(order) | Self::Filled { order, .. } => order,
        }
    }

    /// Stable label used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Accepted(_) => "accepted",
            Self::Filled { .. } => "filled",
            Self::Cancelled(_) => "cancelled",
        }
    }
}
