//! Order Ledger Domain Services
//!
//! Stateless rules shared by the reconciler and the records.

mod classifier;
mod status_transitions;

pub use classifier::{CancelKind, Classification, FillKind, classify};
pub use status_transitions::{StatusTransitions, TransitionOutcome};
