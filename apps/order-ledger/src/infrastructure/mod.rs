//! Infrastructure Layer
//!
//! Adapters implementing the domain and application ports.
//!
//! - `persistence`: transactional in-memory ledger store with snapshots
//! - `feed`: JSONL replay of recorded venue updates
//! - `observer`: tracing-backed ledger observer

pub mod feed;
pub mod observer;
pub mod persistence;
