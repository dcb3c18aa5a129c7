//! Application Ports (Driver and Driven)
//!
//! Ports define interfaces for interacting with external systems.
//! - **Driven Ports** (Secondary/Outbound): the venue feed the loop consumes
//! - **Driver Ports** (Primary/Inbound): the observer the ledger reports to

mod ledger_observer_port;
mod venue_feed_port;

pub use ledger_observer_port::{LedgerObserver, NoOpObserver, StatusSnapshot};
pub use venue_feed_port::{ChangeSet, FeedError, FeedUpdate, SubmitOrderRequest, VenueFeedPort};
