//! Ledger Store Traits
//!
//! Defines the persistence abstraction for order and trade records.
//! Implemented by adapters in the infrastructure layer.
//!
//! Every write goes through a [`LedgerTransaction`] so that one logical
//! update (an order transition plus its fills) becomes durable as a unit
//! or not at all.

use async_trait::async_trait;
use thiserror::Error;

use super::aggregate::{OrderRecord, TradeRecord};
use crate::domain::shared::{OrderId, TradeId};

/// Persistence errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("duplicate {entity} '{key}'")]
    UniqueViolation {
        /// Entity kind ("order" or "trade").
        entity: &'static str,
        /// Conflicting key.
        key: String,
    },

    /// The record to update does not exist.
    #[error("{entity} '{key}' not found")]
    NotFound {
        /// Entity kind.
        entity: &'static str,
        /// Missing key.
        key: String,
    },

    /// The store could not serve the request.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Failure description.
        message: String,
    },

    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,

    /// Snapshot export or import failed.
    #[error("snapshot error: {message}")]
    Snapshot {
        /// Failure description.
        message: String,
    },
}

/// A unit of work against the ledger.
///
/// Reads observe the transaction's own uncommitted writes. Dropping a
/// transaction without committing discards its writes.
#[async_trait]
pub trait LedgerTransaction: Send {
    /// Find an order by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_order(&mut self, order_id: &OrderId) -> Result<Option<OrderRecord>, StoreError>;

    /// Insert a new order.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the order ID is already recorded.
    async fn insert_order(&mut self, order: &OrderRecord) -> Result<(), StoreError>;

    /// Replace an existing order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order is not recorded.
    async fn update_order(&mut self, order: &OrderRecord) -> Result<(), StoreError>;

    /// Find a trade by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_trade(&mut self, trade_id: &TradeId) -> Result<Option<TradeRecord>, StoreError>;

    /// Insert a new trade.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the trade ID is already recorded.
    async fn insert_trade(&mut self, trade: &TradeRecord) -> Result<(), StoreError>;

    /// All orders still resting on the book (ALIVE or PARTIAL_FILL).
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn list_alive_orders(&mut self) -> Result<Vec<OrderRecord>, StoreError>;

    /// Total recorded fill volume for an order.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn trade_volume_for_order(&mut self, order_id: &OrderId) -> Result<u64, StoreError>;

    /// Make all writes durable.
    ///
    /// # Errors
    ///
    /// Returns error if any write conflicts with committed state; nothing
    /// is applied in that case.
    async fn commit(self) -> Result<(), StoreError>;

    /// Discard all writes.
    ///
    /// # Errors
    ///
    /// Returns error if the store could not release the transaction.
    async fn rollback(self) -> Result<(), StoreError>;
}

/// Repository trait for the order ledger.
///
/// This is a domain interface (port) implemented by infrastructure
/// adapters.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Transaction type handed out by [`LedgerStore::begin`].
    type Tx: LedgerTransaction;

    /// Start a transaction.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unavailable.
    async fn begin(&self) -> Result<Self::Tx, StoreError>;

    /// Find an order outside of any caller transaction.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_order(&self, order_id: &OrderId) -> Result<Option<OrderRecord>, StoreError> {
        let mut tx = self.begin().await?;
        let order = tx.find_order(order_id).await?;
        tx.rollback().await?;
        Ok(order)
    }

    /// Find a trade outside of any caller transaction.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_trade(&self, trade_id: &TradeId) -> Result<Option<TradeRecord>, StoreError> {
        let mut tx = self.begin().await?;
        let trade = tx.find_trade(trade_id).await?;
        tx.rollback().await?;
        Ok(trade)
    }

    /// List resting orders outside of any caller transaction.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn list_alive_orders(&self) -> Result<Vec<OrderRecord>, StoreError> {
        let mut tx = self.begin().await?;
        let orders = tx.list_alive_orders().await?;
        tx.rollback().await?;
        Ok(orders)
    }
}
