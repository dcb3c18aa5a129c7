//! Ledger Records
//!
//! `OrderRecord` is the consistency boundary for one order's lifecycle.
//! `TradeRecord` is an immutable fill owned by exactly one order.

mod order_record;
mod trade_record;

pub use order_record::OrderRecord;
pub use trade_record::TradeRecord;
