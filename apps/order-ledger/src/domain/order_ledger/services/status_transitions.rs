//! Ledger Status Transitions
//!
//! Validates the paths an order may take through the ledger lifecycle.

use crate::domain::order_ledger::value_objects::OrderStatus;

/// Result of assessing an incoming status against the recorded one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The record moved to a new state.
    Applied {
        /// Recorded status before the update.
        from: OrderStatus,
        /// Recorded status after the update.
        to: OrderStatus,
    },
    /// The update repeats the recorded state.
    Unchanged,
    /// The update is older than the recorded state and was not applied.
    Stale {
        /// Why the update could not be applied.
        reason: String,
    },
}

impl TransitionOutcome {
    /// Returns true if the record changed.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Ledger status state machine.
pub struct StatusTransitions;

impl StatusTransitions {
    /// Check if a status transition is valid.
    ///
    /// Same-state transitions are valid for non-terminal states so that a
    /// further partial fill, or a re-reported partial cancel, is accepted.
    #[must_use]
    pub const fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        matches!(
            (from, to),
            // From Alive
            (OrderStatus::Alive, OrderStatus::Alive)
                | (OrderStatus::Alive, OrderStatus::PartialFill)
                | (OrderStatus::Alive, OrderStatus::FullFill)
                | (OrderStatus::Alive, OrderStatus::PartialCancel)
                | (OrderStatus::Alive, OrderStatus::FullCancel)
                // From PartialFill
                | (OrderStatus::PartialFill, OrderStatus::PartialFill)
                | (OrderStatus::PartialFill, OrderStatus::FullFill)
                | (OrderStatus::PartialFill, OrderStatus::PartialCancel)
                // From PartialCancel
                | (OrderStatus::PartialCancel, OrderStatus::PartialCancel)
        )
    }

    /// Get all valid next states from a given state.
    #[must_use]
    pub fn valid_next_states(from: OrderStatus) -> Vec<OrderStatus> {
        match from {
            OrderStatus::Alive => vec![
                OrderStatus::Alive,
                OrderStatus::PartialFill,
                OrderStatus::FullFill,
                OrderStatus::PartialCancel,
                OrderStatus::FullCancel,
            ],
            OrderStatus::PartialFill => vec![
                OrderStatus::PartialFill,
                OrderStatus::FullFill,
                OrderStatus::PartialCancel,
            ],
            OrderStatus::PartialCancel => vec![OrderStatus::PartialCancel],
            OrderStatus::FullFill | OrderStatus::FullCancel => vec![],
        }
    }

    /// Get a human-readable reason for an invalid transition.
    #[must_use]
    pub fn transition_error_reason(from: OrderStatus, to: OrderStatus) -> String {
        match from {
            OrderStatus::FullFill => format!("order is already filled, cannot move to {to}"),
            OrderStatus::FullCancel => format!("order is already cancelled, cannot move to {to}"),
            OrderStatus::PartialCancel => {
                format!("order is already partially cancelled, cannot move to {to}")
            }
            _ => format!("invalid transition from {from} to {to}"),
        }
    }

    /// Assess an incoming `(status, volume_left)` against the recorded pair.
    #[must_use]
    pub fn assess(
        current: OrderStatus,
        current_left: u64,
        next: OrderStatus,
        next_left: u64,
    ) -> TransitionOutcome {
        if current == next && current_left == next_left {
            return TransitionOutcome::Unchanged;
        }
        if next_left > current_left {
            return TransitionOutcome::Stale {
                reason: format!("volume_left would grow from {current_left} to {next_left}"),
            };
        }
        if !Self::is_valid_transition(current, next) {
            return TransitionOutcome::Stale {
                reason: Self::transition_error_reason(current, next),
            };
        }
        TransitionOutcome::Applied {
            from: current,
            to: next,
        }
    }
}
