//! Reconciliation error taxonomy.
//!
//! Every failure surfaced by the reconciler, the submission use case or the
//! loop is a [`ReconcileError`]. Whether the loop may keep running is
//! decided by [`ReconcileError::is_fatal`].
//!
//! | Kind                       | Fatal | Effect                                        |
//! |----------------------------|-------|-----------------------------------------------|
//! | `invariant_violation`      | yes   | No mutation; loop halts                       |
//! | `missing_order_on_cancel`  | yes   | No write; loop halts                          |
//! | `duplicate_opponent`       | no    | Close order rejected before submission        |
//! | `opponent_not_found`       | no    | Close order rejected before submission        |
//! | `persistence_failure`      | no    | Transaction rolled back; event reported failed |
//! | `feed_timeout`             | no    | Logged; loop continues                        |
//! | `feed_failure`             | no    | Logged; loop continues                        |

use std::time::Duration;

use thiserror::Error;

use crate::application::ports::FeedError;
use crate::domain::order_ledger::{LedgerError, StoreError};
use crate::domain::shared::OrderId;

/// Errors surfaced while reconciling the ledger with the venue.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The venue's notifications contradict themselves or the ledger.
    #[error("invariant violation on order {order_id}: {detail}")]
    InvariantViolation {
        /// Offending order.
        order_id: OrderId,
        /// What was contradicted.
        detail: String,
    },

    /// A cancel arrived for an order the ledger never recorded.
    #[error("cancel reported for unknown order {order_id}")]
    MissingOrderOnCancel {
        /// Unknown order.
        order_id: OrderId,
    },

    /// The resting order is already offset by a different closing order.
    #[error("order {order_id} is already offset by {existing}")]
    DuplicateOpponent {
        /// Resting order.
        order_id: OrderId,
        /// Opponent already on record.
        existing: OrderId,
    },

    /// A close was requested against an order the ledger never recorded.
    #[error("opponent order {order_id} not found in ledger")]
    OpponentNotFound {
        /// Missing resting order.
        order_id: OrderId,
    },

    /// A store operation failed and the enclosing transaction was rolled back.
    #[error("persistence failure: {0}")]
    PersistenceFailure(#[from] StoreError),

    /// No feed update arrived before the deadline.
    #[error("no feed update within {waited:?}")]
    FeedTimeout {
        /// Deadline that elapsed.
        waited: Duration,
    },

    /// The feed failed to deliver or accept a request.
    #[error("feed failure: {0}")]
    Feed(#[from] FeedError),
}

impl ReconcileError {
    /// Returns true if the process must stop reconciling.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvariantViolation { .. } | Self::MissingOrderOnCancel { .. }
        )
    }

    /// Stable snake_case label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvariantViolation { .. } => "invariant_violation",
            Self::MissingOrderOnCancel { .. } => "missing_order_on_cancel",
            Self::DuplicateOpponent { .. } => "duplicate_opponent",
            Self::OpponentNotFound { .. } => "opponent_not_found",
            Self::PersistenceFailure(_) => "persistence_failure",
            Self::FeedTimeout { .. } => "feed_timeout",
            Self::Feed(_) => "feed_failure",
        }
    }
}

impl From<LedgerError> for ReconcileError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::MissingOrderOnCancel { order_id } => Self::MissingOrderOnCancel { order_id },
            LedgerError::DuplicateOpponent { order_id, existing } => {
                Self::DuplicateOpponent { order_id, existing }
            }
            other => Self::InvariantViolation {
                order_id: other.order_id().clone(),
                detail: other.to_string(),
            },
        }
    }
}
