//! Application Use Cases
//!
//! Each use case is one unit of work against the ledger.

mod reconcile_order;
mod submit_order;

pub use reconcile_order::{ReconcileOrderUseCase, ReconcileOutcome};
pub use submit_order::SubmitOrderUseCase;
