//! Venue Feed Port (Driven Port)
//!
//! Interface to the venue's market-data and order transport. The feed owns
//! the venue's current view of the quote, of every order it has reported
//! and of the position; the loop reads those views after each update.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::market::{PositionState, Quote};
use crate::domain::order_ledger::{Direction, Offset, OrderUpdate};
use crate::domain::shared::{OrderId, Price};

/// Feed errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    /// Connection to the venue was lost.
    #[error("feed disconnected")]
    Disconnected,

    /// The venue refused an order.
    #[error("order rejected by venue: {reason}")]
    SubmitRejected {
        /// Venue-provided reason.
        reason: String,
    },

    /// A message from the venue could not be decoded.
    #[error("malformed feed message at line {line}: {message}")]
    Malformed {
        /// Source line, when known.
        line: usize,
        /// Decoder error.
        message: String,
    },

    /// I/O failure reading the feed.
    #[error("feed I/O error: {message}")]
    Io {
        /// Failure description.
        message: String,
    },
}

/// What changed in the feed's views since the previous update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Best bid or ask changed.
    pub quote: bool,
    /// Orders whose snapshot changed.
    pub orders: BTreeSet<OrderId>,
}

impl ChangeSet {
    /// Returns true if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.quote && self.orders.is_empty()
    }
}

/// Outcome of waiting for the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedUpdate {
    /// The feed's views were refreshed.
    Changed(ChangeSet),
    /// The feed has no more updates; a normal termination.
    EndOfStream,
}

/// Request to submit a limit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOrderRequest {
    /// Side.
    pub direction: Direction,
    /// Open or close.
    pub offset: Offset,
    /// Volume.
    pub volume: u64,
    /// Limit price.
    pub price: Price,
    /// Resting order this close offsets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent: Option<OrderId>,
}

impl SubmitOrderRequest {
    /// Create an opening order request.
    #[must_use]
    pub const fn open(direction: Direction, volume: u64, price: Price) -> Self {
        Self {
            direction,
            offset: Offset::Open,
            volume,
            price,
            opponent: None,
        }
    }

    /// Create a closing order request offsetting `opponent`.
    #[must_use]
    pub const fn close_against(
        direction: Direction,
        volume: u64,
        price: Price,
        opponent: OrderId,
    ) -> Self {
        Self {
            direction,
            offset: Offset::Close,
            volume,
            price,
            opponent: Some(opponent),
        }
    }
}

/// Port for the venue feed.
///
/// `next_update` must be cancel-safe: the loop wraps it in a deadline and
/// drops the future when the deadline elapses.
#[async_trait]
pub trait VenueFeedPort: Send {
    /// Wait for the next update.
    async fn next_update(&mut self) -> Result<FeedUpdate, FeedError>;

    /// Latest quote, if one has been received.
    fn current_quote(&self) -> Option<Quote>;

    /// Latest snapshot of every order the venue has reported.
    fn current_orders(&self) -> &BTreeMap<OrderId, OrderUpdate>;

    /// Venue-authoritative position.
    fn position(&self) -> PositionState;

    /// Submit a limit order and return the venue's order ID.
    async fn submit_order(&mut self, request: &SubmitOrderRequest) -> Result<OrderId, FeedError>;

    /// Release the feed connection.
    async fn close(&mut self) -> Result<(), FeedError>;
}
