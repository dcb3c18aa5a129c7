//! Shared Value Objects
//!
//! Immutable domain types used across bounded contexts.
//! Value objects are compared by value, not identity.

mod identifiers;
mod price;
mod timestamp;

pub use identifiers::{OrderId, TradeId};
pub use price::Price;
pub use timestamp::Timestamp;
