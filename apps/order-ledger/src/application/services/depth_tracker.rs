//! Position & Depth Tracker
//!
//! Derives per-price resting volume from the ledger's resting orders. Net
//! position is not recomputed: the venue is authoritative for settled
//! position, so it is passed through from the feed.

use std::collections::BTreeMap;

use crate::domain::market::{BookState, PositionState, Quote};
use crate::domain::order_ledger::OrderRecord;
use crate::domain::shared::Price;

/// Resting volume per price level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepthTracker {
    depth: BTreeMap<Price, u64>,
}

impl DepthTracker {
    /// Aggregate `volume_left` of resting orders by limit price.
    ///
    /// Orders that are no longer resting are ignored.
    #[must_use]
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a OrderRecord>) -> Self {
        let mut depth = BTreeMap::new();
        for order in orders.into_iter().filter(|o| o.is_resting()) {
            *depth.entry(order.limit_price()).or_insert(0_u64) += order.volume_left();
        }
        Self { depth }
    }

    /// Resting volume at `price`.
    #[must_use]
    pub fn resting_volume(&self, price: Price) -> u64 {
        self.depth.get(&price).copied().unwrap_or(0)
    }

    /// Net position as `(long, short)`, straight from the venue.
    #[must_use]
    pub const fn net_position(position: &PositionState) -> (u64, u64) {
        (position.long, position.short)
    }

    /// Combine with a quote into this cycle's book view.
    #[must_use]
    pub fn into_book_state(self, quote: Quote) -> BookState {
        BookState::new(quote, self.depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_ledger::{Direction, Offset, OrderStatus};
    use crate::domain::shared::{OrderId, Timestamp};
    use rust_decimal_macros::dec;

    fn resting(id: &str, price: Price, volume: u64, filled: u64) -> OrderRecord {
        let mut record = OrderRecord::submitted(
            OrderId::new(id),
            Direction::Buy,
            Offset::Open,
            price,
            volume,
            Timestamp::now(),
        );
        if filled > 0 {
            let status = if filled == volume {
                OrderStatus::FullFill
            } else {
                OrderStatus::PartialFill
            };
            record
                .apply_update(status, volume, volume - filled, Timestamp::now())
                .unwrap();
        }
        record
    }

    #[test]
    fn sums_volume_left_at_each_price() {
        let bid = Price::new(dec!(2380));
        let orders = vec![
            resting("O1", bid, 2, 0),
            resting("O2", Price::new(dec!(2380.0)), 3, 1),
            resting("O3", Price::new(dec!(2379)), 4, 0),
        ];
        let tracker = DepthTracker::from_orders(&orders);
        assert_eq!(tracker.resting_volume(bid), 4);
        assert_eq!(tracker.resting_volume(Price::new(dec!(2379))), 4);
        assert_eq!(tracker.resting_volume(Price::new(dec!(2381))), 0);
    }

    #[test]
    fn finished_orders_do_not_rest() {
        let bid = Price::new(dec!(2380));
        let orders = vec![resting("O1", bid, 2, 2)];
        assert_eq!(DepthTracker::from_orders(&orders).resting_volume(bid), 0);
    }

    #[test]
    fn book_state_carries_depth() {
        let bid = Price::new(dec!(2380));
        let tracker = DepthTracker::from_orders(&[resting("O1", bid, 2, 0)]);
        let book = tracker.into_book_state(Quote {
            best_bid: bid,
            best_ask: Price::new(dec!(2381)),
            at: Timestamp::now(),
        });
        assert_eq!(book.resting_volume(book.best_bid()), 2);
    }

    #[test]
    fn net_position_passes_through() {
        assert_eq!(DepthTracker::net_position(&PositionState::new(3, 1)), (3, 1));
    }
}
