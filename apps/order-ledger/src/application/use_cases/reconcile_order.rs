//! Reconcile Order Use Case
//!
//! Applies one venue order update to the ledger inside a single
//! transaction. Notifications are dispatched only after commit.

use std::sync::Arc;

use crate::application::ports::LedgerObserver;
use crate::application::services::TradeDeduplicator;
use crate::domain::order_ledger::{
    Classification, LedgerError, LedgerNotification, LedgerStore, LedgerTransaction, OrderRecord,
    OrderUpdate, TradeRecord, TransitionOutcome, classify,
};
use crate::domain::shared::{OrderId, Timestamp};
use crate::error::ReconcileError;
use crate::observability;

/// What applying one update did to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Order the update was for.
    pub order_id: OrderId,
    /// How the update was classified.
    pub classification: Classification,
    /// True if the order record was created by this update.
    pub created: bool,
    /// Effect on an existing record; `None` when the record was created or
    /// the update was a re-announcement.
    pub transition: Option<TransitionOutcome>,
    /// Trades recorded for the first time.
    pub trades_inserted: usize,
    /// Trades skipped because they were already recorded.
    pub trades_replayed: usize,
}

/// Staged effect of an update, before commit.
struct Staged {
    outcome: ReconcileOutcome,
    notifications: Vec<LedgerNotification>,
}

/// Use case for reconciling one order update.
pub struct ReconcileOrderUseCase<S, O>
where
    S: LedgerStore,
    O: LedgerObserver,
{
    store: Arc<S>,
    observer: Arc<O>,
}

impl<S, O> ReconcileOrderUseCase<S, O>
where
    S: LedgerStore,
    O: LedgerObserver,
{
    /// Create a new ReconcileOrderUseCase.
    pub fn new(store: Arc<S>, observer: Arc<O>) -> Self {
        Self { store, observer }
    }

    /// Classify and apply `update`, stamping changes with `at`.
    ///
    /// # Errors
    ///
    /// - `InvariantViolation` if the update contradicts itself or the ledger
    /// - `MissingOrderOnCancel` if a cancel arrives for an unrecorded order
    /// - `PersistenceFailure` if any store operation fails
    ///
    /// Nothing is written when an error is returned.
    pub async fn execute(
        &self,
        update: &OrderUpdate,
        at: Timestamp,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let classification = classify(update)?;

        let mut tx = self.store.begin().await?;
        let staged = match Self::apply(&mut tx, classification, update, at).await {
            Ok(staged) => staged,
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(
                        order_id = %update.order_id,
                        error = %rollback,
                        "Rollback failed"
                    );
                }
                return Err(e);
            }
        };
        tx.commit().await?;

        self.dispatch(&staged.notifications);
        Self::record_metrics(&staged.outcome);
        Ok(staged.outcome)
    }

    async fn apply(
        tx: &mut S::Tx,
        classification: Classification,
        update: &OrderUpdate,
        at: Timestamp,
    ) -> Result<Staged, ReconcileError> {
        let mut staged = Staged {
            outcome: ReconcileOutcome {
                order_id: update.order_id.clone(),
                classification,
                created: false,
                transition: None,
                trades_inserted: 0,
                trades_replayed: 0,
            },
            notifications: Vec::new(),
        };
        let status = classification.resulting_status();

        match classification {
            Classification::New => {
                let record = match tx.find_order(&update.order_id).await? {
                    Some(existing) => {
                        tracing::debug!(
                            order_id = %update.order_id,
                            "Order re-announced, keeping recorded state"
                        );
                        existing
                    }
                    None => {
                        let record = OrderRecord::from_update(update, status, at);
                        tx.insert_order(&record).await?;
                        staged.outcome.created = true;
                        record
                    }
                };
                staged.notifications.push(LedgerNotification::Accepted(record));
            }
            Classification::Fill(_) => {
                let record = match tx.find_order(&update.order_id).await? {
                    Some(mut existing) => {
                        let transition = existing.apply_update(
                            status,
                            update.volume_original,
                            update.volume_left,
                            at,
                        )?;
                        Self::write_transition(tx, &existing, &transition).await?;
                        staged.outcome.transition = Some(transition);
                        existing
                    }
                    None => {
                        tracing::info!(
                            order_id = %update.order_id,
                            status = %status,
                            "Fill arrived before acknowledgement, recording order"
                        );
                        let record = OrderRecord::from_update(update, status, at);
                        tx.insert_order(&record).await?;
                        staged.outcome.created = true;
                        staged
                            .notifications
                            .push(LedgerNotification::Accepted(record.clone()));
                        record
                    }
                };
                Self::persist_trades(tx, &record, update, &mut staged).await?;
            }
            Classification::Cancel(_) => {
                let Some(mut existing) = tx.find_order(&update.order_id).await? else {
                    return Err(LedgerError::MissingOrderOnCancel {
                        order_id: update.order_id.clone(),
                    }
                    .into());
                };
                let transition =
                    existing.apply_update(status, update.volume_original, update.volume_left, at)?;
                Self::write_transition(tx, &existing, &transition).await?;
                if transition.is_applied() {
                    staged
                        .notifications
                        .push(LedgerNotification::Cancelled(existing.clone()));
                }
                staged.outcome.transition = Some(transition);
                // A partial cancel may carry fills the ledger has not seen yet.
                Self::persist_trades(tx, &existing, update, &mut staged).await?;
            }
        }

        Ok(staged)
    }

    async fn write_transition(
        tx: &mut S::Tx,
        record: &OrderRecord,
        transition: &TransitionOutcome,
    ) -> Result<(), ReconcileError> {
        match transition {
            TransitionOutcome::Applied { from, to } => {
                tx.update_order(record).await?;
                tracing::info!(
                    order_id = %record.order_id(),
                    from = %from,
                    to = %to,
                    volume_left = record.volume_left(),
                    "Order transitioned"
                );
            }
            TransitionOutcome::Unchanged => {}
            TransitionOutcome::Stale { reason } => {
                tracing::warn!(
                    order_id = %record.order_id(),
                    status = %record.status(),
                    reason = %reason,
                    "Ignoring stale order update"
                );
            }
        }
        Ok(())
    }

    async fn persist_trades(
        tx: &mut S::Tx,
        record: &OrderRecord,
        update: &OrderUpdate,
        staged: &mut Staged,
    ) -> Result<(), ReconcileError> {
        if update.trades.is_empty() {
            return Ok(());
        }

        let mut traded = tx.trade_volume_for_order(record.order_id()).await?;
        for trade in &update.trades {
            if trade.volume == 0 {
                return Err(LedgerError::ZeroVolumeTrade {
                    order_id: record.order_id().clone(),
                    trade_id: trade.trade_id.clone(),
                }
                .into());
            }
            if TradeDeduplicator::seen(&mut *tx, &trade.trade_id).await? {
                staged.outcome.trades_replayed += 1;
                continue;
            }

            traded = traded.saturating_add(trade.volume);
            if traded > record.volume_original() {
                return Err(LedgerError::TradeVolumeExceeded {
                    order_id: record.order_id().clone(),
                    traded,
                    volume_original: record.volume_original(),
                }
                .into());
            }

            let trade_record = TradeRecord::from_update(record, trade);
            tx.insert_trade(&trade_record).await?;
            tracing::info!(
                order_id = %record.order_id(),
                trade_id = %trade.trade_id,
                price = %trade.price,
                volume = trade.volume,
                "Trade recorded"
            );
            staged.outcome.trades_inserted += 1;
            staged.notifications.push(LedgerNotification::Filled {
                order: record.clone(),
                trade_id: trade.trade_id.clone(),
            });
        }
        Ok(())
    }

    fn dispatch(&self, notifications: &[LedgerNotification]) {
        for notification in notifications {
            match notification {
                LedgerNotification::Accepted(order) => self.observer.on_accepted(order),
                LedgerNotification::Filled { order, trade_id } => {
                    self.observer.on_filled(order, trade_id);
                }
                LedgerNotification::Cancelled(order) => self.observer.on_cancelled(order),
            }
        }
    }

    fn record_metrics(outcome: &ReconcileOutcome) {
        let changed = outcome.created
            || outcome
                .transition
                .as_ref()
                .is_some_and(TransitionOutcome::is_applied);
        if changed {
            observability::record_transition(outcome.classification.label());
        }
        if matches!(outcome.transition, Some(TransitionOutcome::Stale { .. })) {
            observability::record_stale_update();
        }
        observability::record_trades(outcome.trades_inserted, outcome.trades_replayed);
    }
}
