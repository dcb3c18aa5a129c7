//! Limit and fill prices.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A price quoted by the venue.
///
/// Backed by a `Decimal` so that depth lookups compare exact price levels.
/// `2380` and `2380.0` are the same level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a new price from a Decimal.
    #[must_use]
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Create a price from a whole number of price units.
    #[must_use]
    pub fn from_i64(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    /// Get the inner Decimal value.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Returns true if the price is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl From<Decimal> for Price {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn equal_levels_ignore_scale() {
        assert_eq!(Price::new(dec!(2380)), Price::new(dec!(2380.00)));
    }

    #[test]
    fn ordering_follows_value() {
        assert!(Price::new(dec!(2379.5)) < Price::new(dec!(2380)));
    }

    #[test]
    fn display_is_normalized() {
        assert_eq!(Price::new(dec!(2380.50)).to_string(), "2380.5");
    }

    #[test]
    fn positivity() {
        assert!(Price::from_i64(1).is_positive());
        assert!(!Price::from_i64(0).is_positive());
    }
}
