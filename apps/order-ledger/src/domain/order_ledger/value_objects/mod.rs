//! Order Ledger Value Objects

mod direction;
mod order_status;
mod order_update;
mod venue_status;

pub use direction::{Direction, Offset};
pub use order_status::OrderStatus;
pub use order_update::{OrderUpdate, TradeUpdate};
pub use venue_status::VenueStatus;
