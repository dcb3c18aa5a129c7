//! Order ledger rule violations.

use thiserror::Error;

use crate::domain::shared::{OrderId, TradeId};

/// Violations of the ledger's rules, raised before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The venue reported an order with nothing left that is still working.
    #[error("order {order_id} reports volume_left=0 while still ALIVE")]
    ZeroLeftWhileAlive {
        /// Order ID.
        order_id: OrderId,
    },

    /// Remaining volume larger than the original volume.
    #[error("order {order_id} reports volume_left={volume_left} above volume_original={volume_original}")]
    LeftExceedsOriginal {
        /// Order ID.
        order_id: OrderId,
        /// Reported remaining volume.
        volume_left: u64,
        /// Reported original volume.
        volume_original: u64,
    },

    /// An order with no volume at all.
    #[error("order {order_id} reports volume_original=0")]
    ZeroOriginal {
        /// Order ID.
        order_id: OrderId,
    },

    /// The venue changed an order's original volume after it was recorded.
    #[error("order {order_id} was recorded with volume_original={recorded}, update reports {reported}")]
    OriginalMismatch {
        /// Order ID.
        order_id: OrderId,
        /// Volume in the ledger.
        recorded: u64,
        /// Volume in the update.
        reported: u64,
    },

    /// A fill with no volume.
    #[error("trade {trade_id} on order {order_id} has zero volume")]
    ZeroVolumeTrade {
        /// Order ID.
        order_id: OrderId,
        /// Trade ID.
        trade_id: TradeId,
    },

    /// Fills for an order add up to more than the order's volume.
    #[error("trades on order {order_id} total {traded}, above volume_original={volume_original}")]
    TradeVolumeExceeded {
        /// Order ID.
        order_id: OrderId,
        /// Total traded volume including the offending trade.
        traded: u64,
        /// Original volume of the order.
        volume_original: u64,
    },

    /// A cancel arrived for an order the ledger never recorded.
    #[error("cancel reported for unknown order {order_id}")]
    MissingOrderOnCancel {
        /// Order ID.
        order_id: OrderId,
    },

    /// The resting order already has a different closing order linked.
    #[error("order {order_id} is already offset by {existing}")]
    DuplicateOpponent {
        /// Resting order ID.
        order_id: OrderId,
        /// Opponent already on record.
        existing: OrderId,
    },
}

impl LedgerError {
    /// Returns true if the error means the venue's notifications contradict
    /// themselves or the ledger.
    #[must_use]
    pub const fn is_invariant_violation(&self) -> bool {
        !matches!(
            self,
            Self::MissingOrderOnCancel { .. } | Self::DuplicateOpponent { .. }
        )
    }

    /// The order the error is about.
    #[must_use]
    pub const fn order_id(&self) -> &OrderId {
        match self {
            Self::ZeroLeftWhileAlive { order_id }
            | Self::LeftExceedsOriginal { order_id, .. }
            | Self::ZeroOriginal { order_id }
            | Self::OriginalMismatch { order_id, .. }
            | Self::ZeroVolumeTrade { order_id, .. }
            | Self::TradeVolumeExceeded { order_id, .. }
            | Self::MissingOrderOnCancel { order_id }
            | Self::DuplicateOpponent { order_id, .. } => order_id,
        }
    }
}
