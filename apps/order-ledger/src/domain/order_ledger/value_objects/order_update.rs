//! Order and trade snapshots delivered by the venue feed.

use serde::{Deserialize, Serialize};

use super::{Direction, Offset, VenueStatus};
use crate::domain::shared::{OrderId, Price, Timestamp, TradeId};

/// The venue's current view of one order.
///
/// Every update carries the full order state rather than a delta, so the
/// same snapshot can be delivered more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    /// Venue order identifier.
    pub order_id: OrderId,
    /// Side.
    pub direction: Direction,
    /// Open or close.
    pub offset: Offset,
    /// Limit price.
    pub limit_price: Price,
    /// Volume at submission.
    pub volume_original: u64,
    /// Volume not yet filled.
    pub volume_left: u64,
    /// Venue status.
    pub status: VenueStatus,
    /// When the venue accepted the order.
    pub insert_time: Timestamp,
    /// Fills known for this order, possibly including already-seen ones.
    #[serde(default)]
    pub trades: Vec<TradeUpdate>,
}

/// One fill reported inside an order update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeUpdate {
    /// Venue trade identifier.
    pub trade_id: TradeId,
    /// Exchange-side trade number, when the venue relays it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange_trade_id: Option<String>,
    /// Fill price.
    pub price: Price,
    /// Fill volume.
    pub volume: u64,
    /// Fill time.
    pub trade_time: Timestamp,
}
