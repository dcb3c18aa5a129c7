//! Trade Deduplicator
//!
//! Guards trade insertion under replay. The store's uniqueness constraint on
//! trade IDs remains the authoritative backstop; this check only keeps
//! replays from reaching it.

use crate::domain::order_ledger::{LedgerTransaction, StoreError};
use crate::domain::shared::TradeId;

/// Answers whether a trade has already been recorded.
pub struct TradeDeduplicator;

impl TradeDeduplicator {
    /// Returns true if `trade_id` is already in the ledger, including writes
    /// staged earlier in `tx`.
    ///
    /// # Errors
    ///
    /// Propagates every store error other than not-found.
    pub async fn seen<T>(tx: &mut T, trade_id: &TradeId) -> Result<bool, StoreError>
    where
        T: LedgerTransaction,
    {
        match tx.find_trade(trade_id).await {
            Ok(found) => Ok(found.is_some()),
            Err(StoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_ledger::{
        Direction, LedgerStore, Offset, OrderRecord, OrderStatus, OrderUpdate, TradeRecord,
        TradeUpdate, VenueStatus,
    };
    use crate::domain::shared::{OrderId, Price, Timestamp};
    use crate::infrastructure::persistence::InMemoryLedgerStore;

    fn order() -> OrderRecord {
        let update = OrderUpdate {
            order_id: OrderId::new("O1"),
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

    fn trade(id: &str) -> TradeRecord {
        TradeRecord::from_update(
            &order(),
            &TradeUpdate {
                trade_id: TradeId::new(id),
                exchange_trade_id: None,
                price: Price::from_i64(2380),
                volume: 1,
                trade_time: Timestamp::now(),
            },
        )
    }

    #[tokio::test]
    async fn unknown_trade_is_not_seen() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().await.unwrap();
        assert!(!TradeDeduplicator::seen(&mut tx, &TradeId::new("T1")).await.unwrap());
    }

    #[tokio::test]
    async fn committed_trade_is_seen() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_order(&order()).await.unwrap();
        tx.insert_trade(&trade("T1")).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert!(TradeDeduplicator::seen(&mut tx, &TradeId::new("T1")).await.unwrap());
    }

    #[tokio::test]
    async fn staged_trade_is_seen_within_transaction() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_order(&order()).await.unwrap();
        tx.insert_trade(&trade("T2")).await.unwrap();
        assert!(TradeDeduplicator::seen(&mut tx, &TradeId::new("T2")).await.unwrap());
    }
}
