// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Order Ledger - Reconciliation Core Library
//!
//! Keeps a durable ledger of the orders and trades a futures strategy has
//! placed, reconciled against the venue's own snapshots, and gates new
//! opening orders on position and resting depth.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core ledger rules
//!   - `order_ledger`: Order and trade records, classification, status lifecycle
//!   - `market`: Quotes, resting depth, position, trading sessions
//!   - `open_condition`: Position and depth gate for new orders
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: Interfaces for external systems (`VenueFeedPort`, `LedgerObserver`)
//!   - `use_cases`: `ReconcileOrder`, `SubmitOrder`
//!   - `services`: Trade deduplication, depth tracking, the reconciliation loop
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `persistence`: Transactional in-memory store with JSON snapshots
//!   - `feed`: JSON Lines replay feed
//!   - `observer`: Tracing-backed observer

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core ledger rules with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Cross-cutting Concerns
// =============================================================================

/// YAML configuration loading and validation.
pub mod config;

/// Error types surfaced by the ledger.
pub mod error;

/// Logging and Prometheus metrics.
pub mod observability;

// =============================================================================
// Re-exports
// =============================================================================

pub use application::ports::{LedgerObserver, VenueFeedPort};
pub use application::services::{LoopSettings, LoopSummary, ReconciliationLoop};
pub use application::use_cases::{ReconcileOrderUseCase, SubmitOrderUseCase};
pub use domain::order_ledger::{
    LedgerStore, OrderRecord, OrderStatus, OrderUpdate, TradeRecord, TradeUpdate,
};
pub use error::ReconcileError;
