//! Application Layer
//!
//! Orchestrates the domain against the outside world.
//!
//! - **Ports**: interfaces for the venue feed and the ledger observer
//! - **Use cases**: reconcile one order update, submit one order
//! - **Services**: trade deduplication, depth tracking, the reconciliation loop

pub mod ports;
pub mod services;
pub mod use_cases;
