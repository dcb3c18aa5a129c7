//! Property-based tests for ledger reconciliation
//!
//! Random order lifecycles are generated as the venue would report them and
//! fed through the reconcile use case, checking the ledger's invariants.

// Allow unwrap in tests - tests should panic on unexpected errors
#![allow(clippy::unwrap_used)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use proptest::prelude::*;

use order_ledger::application::ports::NoOpObserver;
use order_ledger::application::use_cases::ReconcileOrderUseCase;
use order_ledger::domain::market::{BookState, PositionState, Quote};
use order_ledger::domain::open_condition::{OpenConditionEvaluator, OpenSettings};
use order_ledger::domain::order_ledger::{
    Direction, LedgerStore, Offset, OrderUpdate, TradeUpdate, VenueStatus,
};
use order_ledger::domain::shared::{OrderId, Price, Timestamp, TradeId};
use order_ledger::infrastructure::persistence::InMemoryLedgerStore;

/// Venue snapshots for one order: acknowledgement, fills, then optionally a
/// cancel of whatever is left.
fn lifecycle(id: &str, original: u64, fills: &[u64], cancel: bool) -> Vec<OrderUpdate> {
    let base = OrderUpdate {
        order_id: OrderId::new(id),
        direction: Direction::Buy,
        offset: Offset::Open,
        limit_price: Price::from_i64(2380),
        volume_original: original,
        volume_left: original,
        status: VenueStatus::Alive,
        insert_time: Timestamp::parse("2020-11-02T01:00:00Z").unwrap(),
        trades: vec![],
    };

    let mut updates = vec![base.clone()];
    let mut trades = Vec::new();
    let mut left = original;
    for (i, fill) in fills.iter().enumerate() {
        let volume = (*fill).min(left);
        if volume == 0 {
            break;
        }
        left -= volume;
        trades.push(TradeUpdate {
            trade_id: TradeId::new(format!("{id}-T{i}")),
            exchange_trade_id: None,
            price: Price::from_i64(2380),
            volume,
            trade_time: Timestamp::parse("2020-11-02T01:00:05Z").unwrap(),
        });
        updates.push(OrderUpdate {
            volume_left: left,
            status: if left == 0 {
                VenueStatus::Finished
            } else {
                VenueStatus::Alive
            },
            trades: trades.clone(),
            ..base.clone()
        });
    }
    if cancel && left > 0 {
        updates.push(OrderUpdate {
            volume_left: left,
            status: VenueStatus::Finished,
            trades,
            ..base
        });
    }
    updates
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn ledger() -> (
    Arc<InMemoryLedgerStore>,
    ReconcileOrderUseCase<InMemoryLedgerStore, NoOpObserver>,
) {
    let store = Arc::new(InMemoryLedgerStore::new());
    let use_case = ReconcileOrderUseCase::new(Arc::clone(&store), Arc::new(NoOpObserver));
    (store, use_case)
}

prop_compose! {
    fn arb_lifecycle()(
        original in 1u64..=8,
        fills in prop::collection::vec(1u64..=3, 0..5),
        cancel in any::<bool>(),
    ) -> Vec<OrderUpdate> {
        lifecycle("O1", original, &fills, cancel)
    }
}

proptest! {
    /// Remaining volume never grows and recorded trades never exceed the order.
    #[test]
    fn volume_left_is_monotonic(updates in arb_lifecycle()) {
        runtime().block_on(async {
            let (store, use_case) = ledger();
            let id = OrderId::new("O1");
            let mut previous = u64::MAX;

            for update in &updates {
                use_case.execute(update, Timestamp::now()).await.unwrap();
                let record = store.find_order(&id).await.unwrap().unwrap();
                prop_assert!(record.volume_left() <= previous);
                previous = record.volume_left();
            }

            let ledger = store.snapshot().unwrap();
            let traded: u64 = ledger.trades.iter().map(|t| t.volume()).sum();
            let order = &ledger.orders[0];
            prop_assert_eq!(traded, order.volume_original() - order.volume_left());
            Ok(())
        })?;
    }

    /// Replaying every snapshot again leaves the ledger untouched.
    #[test]
    fn replay_is_idempotent(updates in arb_lifecycle()) {
        runtime().block_on(async {
            let (store, use_case) = ledger();
            for update in &updates {
                use_case.execute(update, Timestamp::now()).await.unwrap();
            }
            let once = store.snapshot().unwrap();

            for update in &updates {
                use_case.execute(update, Timestamp::now()).await.unwrap();
            }
            prop_assert_eq!(store.snapshot().unwrap(), once);
            Ok(())
        })?;
    }

    /// Order and trade ids stay unique across interleaved lifecycles.
    #[test]
    fn ids_stay_unique(
        first in arb_lifecycle(),
        fills in prop::collection::vec(1u64..=3, 0..5),
        cancel in any::<bool>(),
    ) {
        let second = lifecycle("O2", 6, &fills, cancel);
        runtime().block_on(async {
            let (store, use_case) = ledger();
            for update in first.iter().chain(second.iter()).chain(first.iter()) {
                use_case.execute(update, Timestamp::now()).await.unwrap();
            }

            let ledger = store.snapshot().unwrap();
            let order_ids: BTreeSet<_> = ledger.orders.iter().map(|o| o.order_id().clone()).collect();
            let trade_ids: BTreeSet<_> = ledger.trades.iter().map(|t| t.trade_id().clone()).collect();
            prop_assert_eq!(order_ids.len(), ledger.orders.len());
            prop_assert_eq!(order_ids.len(), 2);
            prop_assert_eq!(trade_ids.len(), ledger.trades.len());
            Ok(())
        })?;
    }

    /// A contradictory snapshot is rejected without touching the ledger.
    #[test]
    fn rejected_update_leaves_ledger_unchanged(
        updates in arb_lifecycle(),
        reported_original in 9u64..20,
    ) {
        runtime().block_on(async {
            let (store, use_case) = ledger();
            for update in &updates {
                use_case.execute(update, Timestamp::now()).await.unwrap();
            }
            let before = store.snapshot().unwrap();

            let mut zero_left_alive = updates[0].clone();
            zero_left_alive.volume_left = 0;
            prop_assert!(use_case.execute(&zero_left_alive, Timestamp::now()).await.is_err());

            let mut mismatched = updates[0].clone();
            mismatched.volume_original = reported_original;
            mismatched.volume_left = reported_original - 1;
            prop_assert!(use_case.execute(&mismatched, Timestamp::now()).await.is_err());

            prop_assert_eq!(store.snapshot().unwrap(), before);
            Ok(())
        })?;
    }

    /// The gate opens exactly when both the position and depth limits allow.
    #[test]
    fn open_condition_matches_limits(
        long in 0u64..15,
        short in 0u64..15,
        at_bid in 0u64..8,
        at_ask in 0u64..8,
        elsewhere in 0u64..50,
        volume_per_order in 1u64..4,
    ) {
        let settings = OpenSettings {
            max_position: 10,
            volume_per_order,
            volume_per_price: 5,
        };
        let quote = Quote {
            best_bid: Price::from_i64(2380),
            best_ask: Price::from_i64(2381),
            at: Timestamp::now(),
        };
        let depth = BTreeMap::from([
            (quote.best_bid, at_bid),
            (quote.best_ask, at_ask),
            (Price::from_i64(2379), elsewhere),
        ]);
        let book = BookState::new(quote, depth);
        let position = PositionState::new(long, short);

        let expected = long + short < 10 && at_bid + at_ask + volume_per_order < 5;
        prop_assert_eq!(
            OpenConditionEvaluator::may_open(&settings, &position, &book),
            expected
        );
    }
}
