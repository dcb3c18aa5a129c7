//! Trade Record
//!
//! An immutable fill, created once at first sighting.

use serde::{Deserialize, Serialize};

use super::OrderRecord;
use crate::domain::order_ledger::value_objects::{Direction, Offset, TradeUpdate};
use crate::domain::shared::{OrderId, Price, Timestamp, TradeId};

/// Ledger record for one fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    trade_id: TradeId,
    order_id: OrderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exchange_trade_id: Option<String>,
    price: Price,
    volume: u64,
    direction: Direction,
    offset: Offset,
    occurred_at: Timestamp,
}

impl TradeRecord {
    /// Build a trade record owned by `order`.
    #[must_use]
    pub fn from_update(order: &OrderRecord, trade: &TradeUpdate) -> Self {
        Self {
            trade_id: trade.trade_id.clone(),
            order_id: order.order_id().clone(),
            exchange_trade_id: trade.exchange_trade_id.clone(),
            price: trade.price,
            volume: trade.volume,
            direction: order.direction(),
            offset: order.offset(),
            occurred_at: trade.trade_time,
        }
    }

    /// Venue trade ID.
    #[must_use]
    pub const fn trade_id(&self) -> &TradeId {
        &self.trade_id
    }

    /// Owning order.
    #[must_use]
    pub const fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    /// Exchange-side trade number.
    #[must_use]
    pub fn exchange_trade_id(&self) -> Option<&str> {
        self.exchange_trade_id.as_deref()
    }

    /// Fill price.
    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    /// Fill volume.
    #[must_use]
    pub const fn volume(&self) -> u64 {
        self.volume
    }

    /// Side, inherited from the order.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Offset, inherited from the order.
    #[must_use]
    pub const fn offset(&self) -> Offset {
        self.offset
    }

    /// Fill time.
    #[must_use]
    pub const fn occurred_at(&self) -> Timestamp {
        self.occurred_at
    }
}
