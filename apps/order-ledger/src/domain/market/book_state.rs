//! Top-of-book quote and resting depth.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::shared::{Price, Timestamp};

/// Best bid and ask as last reported by the venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Best bid price.
    pub best_bid: Price,
    /// Best ask price.
    pub best_ask: Price,
    /// Venue time of the quote.
    pub at: Timestamp,
}

impl Quote {
    /// Returns true if bid or ask differ from `other`.
    #[must_use]
    pub fn prices_differ(&self, other: &Self) -> bool {
        self.best_bid != other.best_bid || self.best_ask != other.best_ask
    }
}

/// Book view for one cycle: the quote plus this ledger's resting volume per
/// price level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookState {
    best_bid: Price,
    best_ask: Price,
    depth: BTreeMap<Price, u64>,
    at: Timestamp,
}

impl BookState {
    /// Build a book view from a quote and per-level resting volume.
    #[must_use]
    pub const fn new(quote: Quote, depth: BTreeMap<Price, u64>) -> Self {
        Self {
            best_bid: quote.best_bid,
            best_ask: quote.best_ask,
            depth,
            at: quote.at,
        }
    }

    /// Best bid price.
    #[must_use]
    pub const fn best_bid(&self) -> Price {
        self.best_bid
    }

    /// Best ask price.
    #[must_use]
    pub const fn best_ask(&self) -> Price {
        self.best_ask
    }

    /// Feed time the book was taken at.
    #[must_use]
    pub const fn at(&self) -> Timestamp {
        self.at
    }

    /// Resting volume at `price`; zero for levels with no orders.
    #[must_use]
    pub fn resting_volume(&self, price: Price) -> u64 {
        self.depth.get(&price).copied().unwrap_or(0)
    }

    /// Price levels with resting volume, lowest first.
    pub fn levels(&self) -> impl Iterator<Item = (Price, u64)> + '_ {
        self.depth.iter().map(|(price, volume)| (*price, *volume))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn quote() -> Quote {
        Quote {
            best_bid: Price::new(dec!(2380)),
            best_ask: Price::new(dec!(2381)),
            at: Timestamp::now(),
        }
    }

    #[test]
    fn resting_volume_defaults_to_zero() {
        let book = BookState::new(quote(), BTreeMap::new());
        assert_eq!(book.resting_volume(Price::new(dec!(2380))), 0);
    }

    #[test]
    fn resting_volume_matches_level_regardless_of_scale() {
        let depth = BTreeMap::from([(Price::new(dec!(2380.0)), 3)]);
        let book = BookState::new(quote(), depth);
        assert_eq!(book.resting_volume(Price::new(dec!(2380))), 3);
        assert_eq!(book.levels().count(), 1);
    }

    #[test]
    fn prices_differ_ignores_timestamp() {
        let a = quote();
        let mut b = a;
        b.at = Timestamp::parse("2020-11-02T01:00:00Z").unwrap();
        assert!(!a.prices_differ(&b));
        b.best_ask = Price::new(dec!(2382));
        assert!(a.prices_differ(&b));
    }
}
