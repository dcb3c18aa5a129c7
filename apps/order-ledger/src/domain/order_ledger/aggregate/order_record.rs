//! Order Record
//!
//! Persisted lifecycle state for one order. Records are never deleted;
//! they only move forward until FULL_FILL or FULL_CANCEL.

use serde::{Deserialize, Serialize};

use crate::domain::order_ledger::errors::LedgerError;
use crate::domain::order_ledger::services::{StatusTransitions, TransitionOutcome};
use crate::domain::order_ledger::value_objects::{Direction, Offset, OrderStatus, OrderUpdate};
use crate::domain::shared::{OrderId, Price, Timestamp};

/// Ledger record for one venue order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    order_id: OrderId,
    direction: Direction,
    offset: Offset,
    limit_price: Price,
    volume_original: u64,
    volume_left: u64,
    status: OrderStatus,
    #[serde(default)]
    opponent_order_id: Option<OrderId>,
    inserted_at: Timestamp,
    last_updated_at: Timestamp,
}

impl OrderRecord {
    /// Record an order from the venue's snapshot, taking the given status.
    ///
    /// Used both on first sighting and when a fill arrives for an order
    /// whose acknowledgement was never seen.
    #[must_use]
    pub fn from_update(update: &OrderUpdate, status: OrderStatus, at: Timestamp) -> Self {
        Self {
            order_id: update.order_id.clone(),
            direction: update.direction,
            offset: update.offset,
            limit_price: update.limit_price,
            volume_original: update.volume_original,
            volume_left: update.volume_left,
            status,
            opponent_order_id: None,
            inserted_at: update.insert_time,
            last_updated_at: at,
        }
    }

    /// Record an order this process just submitted to the venue.
    #[must_use]
    pub fn submitted(
        order_id: OrderId,
        direction: Direction,
        offset: Offset,
        limit_price: Price,
        volume: u64,
        at: Timestamp,
    ) -> Self {
        Self {
            order_id,
            direction,
            offset,
            limit_price,
            volume_original: volume,
            volume_left: volume,
            status: OrderStatus::Alive,
            opponent_order_id: None,
            inserted_at: at,
            last_updated_at: at,
        }
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Venue order ID.
    #[must_use]
    pub const fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    /// Side.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Open or close.
    #[must_use]
    pub const fn offset(&self) -> Offset {
        self.offset
    }

    /// Limit price.
    #[must_use]
    pub const fn limit_price(&self) -> Price {
        self.limit_price
    }

    /// Volume at submission.
    #[must_use]
    pub const fn volume_original(&self) -> u64 {
        self.volume_original
    }

    /// Volume not yet filled.
    #[must_use]
    pub const fn volume_left(&self) -> u64 {
        self.volume_left
    }

    /// Ledger status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// The closing order linked to this one, if any.
    #[must_use]
    pub const fn opponent_order_id(&self) -> Option<&OrderId> {
        self.opponent_order_id.as_ref()
    }

    /// When the venue accepted the order.
    #[must_use]
    pub const fn inserted_at(&self) -> Timestamp {
        self.inserted_at
    }

    /// When the ledger last changed this record.
    #[must_use]
    pub const fn last_updated_at(&self) -> Timestamp {
        self.last_updated_at
    }

    /// Returns true if the order still contributes depth at its price.
    #[must_use]
    pub const fn is_resting(&self) -> bool {
        self.status.is_resting()
    }

    // ========================================================================
    // State Transitions
    // ========================================================================

    /// Move the record to the venue's latest view.
    ///
    /// The record is only mutated when the outcome is `Applied`.
    ///
    /// # Errors
    ///
    /// Returns `OriginalMismatch` if the venue reports a different original
    /// volume than the one recorded.
    pub fn apply_update(
        &mut self,
        status: OrderStatus,
        volume_original: u64,
        volume_left: u64,
        at: Timestamp,
    ) -> Result<TransitionOutcome, LedgerError> {
        if volume_original != self.volume_original {
            return Err(LedgerError::OriginalMismatch {
                order_id: self.order_id.clone(),
                recorded: self.volume_original,
                reported: volume_original,
            });
        }

        let outcome =
            StatusTransitions::assess(self.status, self.volume_left, status, volume_left);
        if outcome.is_applied() {
            self.status = status;
            self.volume_left = volume_left;
            self.last_updated_at = at;
        }
        Ok(outcome)
    }

    /// Link the order that offsets this one.
    ///
    /// Returns `Ok(false)` if the same opponent is already linked.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateOpponent` if a different opponent is already linked.
    pub fn link_opponent(&mut self, opponent: &OrderId) -> Result<bool, LedgerError> {
        match &self.opponent_order_id {
            Some(existing) if existing == opponent => Ok(false),
            Some(existing) => Err(LedgerError::DuplicateOpponent {
                order_id: self.order_id.clone(),
                existing: existing.clone(),
            }),
            None => {
                self.opponent_order_id = Some(opponent.clone());
                Ok(true)
            }
        }
    }
}
