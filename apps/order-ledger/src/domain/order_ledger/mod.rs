//! Order Ledger Bounded Context
//!
//! Reconciles the venue's view of each order into one durable record per
//! order and one immutable record per fill.
//!
//! # Lifecycle
//!
//! ```text
//! ALIVE ──► PARTIAL_FILL ──► FULL_FILL
//!   │            │
//!   │            └──► PARTIAL_CANCEL
//!   ├──► FULL_FILL
//!   ├──► PARTIAL_CANCEL
//!   └──► FULL_CANCEL
//! ```

pub mod aggregate;
pub mod errors;
pub mod events;
pub mod repository;
pub mod services;
pub mod value_objects;

pub use aggregate::{OrderRecord, TradeRecord};
pub use errors::LedgerError;
pub use events::LedgerNotification;
pub use repository::{LedgerStore, LedgerTransaction, StoreError};
pub use services::{
    CancelKind, Classification, FillKind, StatusTransitions, TransitionOutcome, classify,
};
pub use value_objects::{Direction, Offset, OrderStatus, OrderUpdate, TradeUpdate, VenueStatus};
