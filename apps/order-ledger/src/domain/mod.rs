//! Domain Layer
//!
//! The innermost layer containing ledger rules with zero infrastructure dependencies.
//! This layer defines:
//!
//! - **Aggregates**: Order and trade records with their invariants
//! - **Value Objects**: Immutable domain types with equality by value
//! - **Domain Services**: Stateless classification and transition rules
//! - **Repository Traits**: Persistence abstractions (implemented in adapters)
//!
//! # Bounded Contexts
//!
//! - [`order_ledger`]: Order lifecycle reconciliation and trade bookkeeping
//! - [`market`]: Book, position and trading-session state
//! - [`open_condition`]: Position and depth gate for new orders

pub mod market;
pub mod open_condition;
pub mod order_ledger;
pub mod shared;
