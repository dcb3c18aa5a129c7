//! In-memory ledger store.
//!
//! Transactions stage their writes privately and apply them under a single
//! write lock on commit, after re-checking the uniqueness constraints on
//! order and trade IDs against committed state.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::order_ledger::{
    LedgerStore, LedgerTransaction, OrderRecord, StoreError, TradeRecord,
};
use crate::domain::shared::{OrderId, TradeId};

#[derive(Debug, Default)]
struct LedgerState {
    orders: BTreeMap<OrderId, OrderRecord>,
    trades: BTreeMap<TradeId, TradeRecord>,
}

/// Serializable copy of the whole ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Every order record, by ID.
    pub orders: Vec<OrderRecord>,
    /// Every trade record, by ID.
    pub trades: Vec<TradeRecord>,
}

/// In-memory implementation of `LedgerStore`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedgerStore {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryLedgerStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns `UniqueViolation` if the snapshot repeats an ID, or
    /// `Snapshot` if a trade references an unknown order.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Result<Self, StoreError> {
        let mut state = LedgerState::default();
        for order in snapshot.orders {
            let key = order.order_id().clone();
            if state.orders.insert(key.clone(), order).is_some() {
                return Err(StoreError::UniqueViolation {
                    entity: "order",
                    key: key.into_inner(),
                });
            }
        }
        for trade in snapshot.trades {
            if !state.orders.contains_key(trade.order_id()) {
                return Err(StoreError::Snapshot {
                    message: format!(
                        "trade {} references unknown order {}",
                        trade.trade_id(),
                        trade.order_id()
                    ),
                });
            }
            let key = trade.trade_id().clone();
            if state.trades.insert(key.clone(), trade).is_some() {
                return Err(StoreError::UniqueViolation {
                    entity: "trade",
                    key: key.into_inner(),
                });
            }
        }
        Ok(Self {
            state: Arc::new(RwLock::new(state)),
        })
    }

    /// Copy the committed ledger.
    ///
    /// # Errors
    ///
    /// Returns `Poisoned` if a writer panicked while holding the lock.
    pub fn snapshot(&self) -> Result<LedgerSnapshot, StoreError> {
        let state = self.read()?;
        Ok(LedgerSnapshot {
            orders: state.orders.values().cloned().collect(),
            trades: state.trades.values().cloned().collect(),
        })
    }

    /// Load a JSON snapshot file.
    ///
    /// # Errors
    ///
    /// Returns `Snapshot` if the file cannot be read or parsed.
    pub fn load_json(path: &Path) -> Result<Self, StoreError> {
        let contents = std::fs::read_to_string(path).map_err(|e| StoreError::Snapshot {
            message: format!("failed to read '{}': {e}", path.display()),
        })?;
        let snapshot: LedgerSnapshot =
            serde_json::from_str(&contents).map_err(|e| StoreError::Snapshot {
                message: format!("failed to parse '{}': {e}", path.display()),
            })?;
        Self::from_snapshot(snapshot)
    }

    /// Write the committed ledger to a JSON snapshot file.
    ///
    /// # Errors
    ///
    /// Returns `Snapshot` if serialization or the write fails.
    pub fn save_json(&self, path: &Path) -> Result<(), StoreError> {
        let snapshot = self.snapshot()?;
        let json = serde_json::to_string_pretty(&snapshot).map_err(|e| StoreError::Snapshot {
            message: e.to_string(),
        })?;
        std::fs::write(path, json).map_err(|e| StoreError::Snapshot {
            message: format!("failed to write '{}': {e}", path.display()),
        })
    }

    /// Number of committed orders.
    ///
    /// # Errors
    ///
    /// Returns `Poisoned` if a writer panicked while holding the lock.
    pub fn order_count(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.orders.len())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, LedgerState>, StoreError> {
        self.state.read().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    type Tx = InMemoryTransaction;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        Ok(InMemoryTransaction {
            state: Arc::clone(&self.state),
            inserted_orders: BTreeMap::new(),
            updated_orders: BTreeMap::new(),
            inserted_trades: BTreeMap::new(),
        })
    }
}

/// Transaction over an [`InMemoryLedgerStore`].
#[derive(Debug)]
pub struct InMemoryTransaction {
    state: Arc<RwLock<LedgerState>>,
    inserted_orders: BTreeMap<OrderId, OrderRecord>,
    updated_orders: BTreeMap<OrderId, OrderRecord>,
    inserted_trades: BTreeMap<TradeId, TradeRecord>,
}

impl InMemoryTransaction {
    fn read(&self) -> Result<RwLockReadGuard<'_, LedgerState>, StoreError> {
        self.state.read().map_err(|_| StoreError::Poisoned)
    }

    fn staged_order(&self, order_id: &OrderId) -> Option<&OrderRecord> {
        self.updated_orders
            .get(order_id)
            .or_else(|| self.inserted_orders.get(order_id))
    }
}

#[async_trait]
impl LedgerTransaction for InMemoryTransaction {
    async fn find_order(&mut self, order_id: &OrderId) -> Result<Option<OrderRecord>, StoreError> {
        if let Some(order) = self.staged_order(order_id) {
            return Ok(Some(order.clone()));
        }
        Ok(self.read()?.orders.get(order_id).cloned())
    }

    async fn insert_order(&mut self, order: &OrderRecord) -> Result<(), StoreError> {
        let key = order.order_id();
        let exists = self.inserted_orders.contains_key(key) || self.read()?.orders.contains_key(key);
        if exists {
            return Err(StoreError::UniqueViolation {
                entity: "order",
                key: key.to_string(),
            });
        }
        self.inserted_orders.insert(key.clone(), order.clone());
        Ok(())
    }

    async fn update_order(&mut self, order: &OrderRecord) -> Result<(), StoreError> {
        let key = order.order_id();
        if let Some(staged) = self.inserted_orders.get_mut(key) {
            *staged = order.clone();
            return Ok(());
        }
        if !self.read()?.orders.contains_key(key) {
            return Err(StoreError::NotFound {
                entity: "order",
                key: key.to_string(),
            });
        }
        self.updated_orders.insert(key.clone(), order.clone());
        Ok(())
    }

    async fn find_trade(&mut self, trade_id: &TradeId) -> Result<Option<TradeRecord>, StoreError> {
        if let Some(trade) = self.inserted_trades.get(trade_id) {
            return Ok(Some(trade.clone()));
        }
        Ok(self.read()?.trades.get(trade_id).cloned())
    }

    async fn insert_trade(&mut self, trade: &TradeRecord) -> Result<(), StoreError> {
        let key = trade.trade_id();
        let exists = self.inserted_trades.contains_key(key) || self.read()?.trades.contains_key(key);
        if exists {
            return Err(StoreError::UniqueViolation {
                entity: "trade",
                key: key.to_string(),
            });
        }
        self.inserted_trades.insert(key.clone(), trade.clone());
        Ok(())
    }

    async fn list_alive_orders(&mut self) -> Result<Vec<OrderRecord>, StoreError> {
        let mut merged: BTreeMap<OrderId, OrderRecord> = self.read()?.orders.clone();
        for (id, order) in self.inserted_orders.iter().chain(&self.updated_orders) {
            merged.insert(id.clone(), order.clone());
        }
        Ok(merged.into_values().filter(OrderRecord::is_resting).collect())
    }

    async fn trade_volume_for_order(&mut self, order_id: &OrderId) -> Result<u64, StoreError> {
        let committed: u64 = self
            .read()?
            .trades
            .values()
            .filter(|t| t.order_id() == order_id)
            .map(TradeRecord::volume)
            .sum();
        let staged: u64 = self
            .inserted_trades
            .values()
            .filter(|t| t.order_id() == order_id)
            .map(TradeRecord::volume)
            .sum();
        Ok(committed + staged)
    }

    async fn commit(self) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned)?;

        // Check everything first so a conflict leaves committed state untouched.
        if let Some(key) = self.inserted_orders.keys().find(|k| state.orders.contains_key(*k)) {
            return Err(StoreError::UniqueViolation {
                entity: "order",
                key: key.to_string(),
            });
        }
        if let Some(key) = self.inserted_trades.keys().find(|k| state.trades.contains_key(*k)) {
            return Err(StoreError::UniqueViolation {
                entity: "trade",
                key: key.to_string(),
            });
        }
        if let Some(key) = self.updated_orders.keys().find(|k| !state.orders.contains_key(*k)) {
            return Err(StoreError::NotFound {
                entity: "order",
                key: key.to_string(),
            });
        }

        state.orders.extend(self.inserted_orders);
        state.orders.extend(self.updated_orders);
        state.trades.extend(self.inserted_trades);
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_ledger::{
        Direction, Offset, OrderStatus, OrderUpdate, TradeUpdate, VenueStatus,
    };
    use crate::domain::shared::{Price, Timestamp};

    fn order(id: &str) -> OrderRecord {
        let update = OrderUpdate {
            order_id: OrderId::new(id),
            direction: Direction::Buy,
            offset: Offset::Open,
            limit_price: Price::from_i64(2380),
            volume_original: 5,
            volume_left: 5,
            status: VenueStatus::Alive,
            insert_time: Timestamp::now(),
            trades: vec![],
        };
        OrderRecord::from_update(&update, OrderStatus::Alive, Timestamp::now())
    }

    fn trade(order: &OrderRecord, id: &str, volume: u64) -> TradeRecord {
        TradeRecord::from_update(
            order,
            &TradeUpdate {
                trade_id: TradeId::new(id),
                exchange_trade_id: None,
                price: Price::from_i64(2380),
                volume,
                trade_time: Timestamp::now(),
            },
        )
    }

    #[tokio::test]
    async fn uncommitted_writes_are_invisible() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_order(&order("O1")).await.unwrap();
        assert!(store.find_order(&OrderId::new("O1")).await.unwrap().is_none());
        tx.commit().await.unwrap();
        assert!(store.find_order(&OrderId::new("O1")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn rollback_discards_writes() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_order(&order("O1")).await.unwrap();
        tx.rollback().await.unwrap();
        assert_eq!(store.order_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn duplicate_order_insert_is_rejected() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_order(&order("O1")).await.unwrap();
        let err = tx.insert_order(&order("O1")).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { entity: "order", .. }));
    }

    #[tokio::test]
    async fn commit_rechecks_uniqueness_against_concurrent_writer() {
        let store = InMemoryLedgerStore::new();
        let o1 = order("O1");
        let mut seed = store.begin().await.unwrap();
        seed.insert_order(&o1).await.unwrap();
        seed.commit().await.unwrap();

        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();
        first.insert_trade(&trade(&o1, "T1", 1)).await.unwrap();
        second.insert_trade(&trade(&o1, "T1", 1)).await.unwrap();
        first.commit().await.unwrap();

        let err = second.commit().await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { entity: "trade", .. }));
        assert_eq!(store.snapshot().unwrap().trades.len(), 1);
    }

    #[tokio::test]
    async fn update_of_unknown_order_is_not_found() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().await.unwrap();
        let err = tx.update_order(&order("O1")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn list_alive_orders_sees_staged_state() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().await.unwrap();
        let mut o1 = order("O1");
        tx.insert_order(&o1).await.unwrap();
        tx.insert_order(&order("O2")).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        o1.apply_update(OrderStatus::FullCancel, 5, 5, Timestamp::now()).unwrap();
        tx.update_order(&o1).await.unwrap();
        let alive = tx.list_alive_orders().await.unwrap();
        assert_eq!(alive.len(), 1);
        assert_eq!(alive[0].order_id().as_str(), "O2");
        assert_eq!(store.list_alive_orders().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn trade_volume_includes_staged_trades() {
        let store = InMemoryLedgerStore::new();
        let o1 = order("O1");
        let mut tx = store.begin().await.unwrap();
        tx.insert_order(&o1).await.unwrap();
        tx.insert_trade(&trade(&o1, "T1", 2)).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.insert_trade(&trade(&o1, "T2", 1)).await.unwrap();
        assert_eq!(tx.trade_volume_for_order(o1.order_id()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn snapshot_round_trips_through_json_file() {
        let store = InMemoryLedgerStore::new();
        let o1 = order("O1");
        let mut tx = store.begin().await.unwrap();
        tx.insert_order(&o1).await.unwrap();
        tx.insert_trade(&trade(&o1, "T1", 2)).await.unwrap();
        tx.commit().await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        store.save_json(&path).unwrap();
        let restored = InMemoryLedgerStore::load_json(&path).unwrap();
        assert_eq!(restored.snapshot().unwrap(), store.snapshot().unwrap());
    }

    #[test]
    fn snapshot_with_orphan_trade_is_rejected() {
        let o1 = order("O1");
        let snapshot = LedgerSnapshot {
            orders: vec![],
            trades: vec![trade(&o1, "T1", 1)],
        };
        assert!(matches!(
            InMemoryLedgerStore::from_snapshot(snapshot),
            Err(StoreError::Snapshot { .. })
        ));
    }
}
