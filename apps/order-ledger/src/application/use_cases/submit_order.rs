//! Submit Order Use Case
//!
//! Sends a limit order to the venue and records it. A closing order may
//! name the resting order it offsets; the link is written on both records
//! and a second, different closer for the same resting order is rejected
//! before anything reaches the venue.

use std::sync::Arc;

use crate::application::ports::{SubmitOrderRequest, VenueFeedPort};
use crate::domain::order_ledger::{LedgerStore, LedgerTransaction, OrderRecord};
use crate::domain::shared::{OrderId, Timestamp};
use crate::error::ReconcileError;
use crate::observability;

/// Use case for submitting and recording an order.
pub struct SubmitOrderUseCase<S>
where
    S: LedgerStore,
{
    store: Arc<S>,
}

impl<S> SubmitOrderUseCase<S>
where
    S: LedgerStore,
{
    /// Create a new SubmitOrderUseCase.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Submit `request` through `feed` and record the new order as ALIVE.
    ///
    /// # Errors
    ///
    /// - `OpponentNotFound` if the named resting order is not in the ledger
    /// - `DuplicateOpponent` if it is already offset by another order
    /// - `Feed` if the venue rejects the order
    /// - `PersistenceFailure` if recording fails after the venue accepted
    pub async fn execute<F>(
        &self,
        feed: &mut F,
        request: &SubmitOrderRequest,
        at: Timestamp,
    ) -> Result<OrderRecord, ReconcileError>
    where
        F: VenueFeedPort,
    {
        if let Some(opponent) = &request.opponent {
            self.check_opponent(opponent).await?;
        }

        let order_id = match feed.submit_order(request).await {
            Ok(id) => id,
            Err(e) => {
                observability::record_submission("rejected");
                return Err(e.into());
            }
        };

        let record = match self.record(&order_id, request, at).await {
            Ok(record) => record,
            Err(e) => {
                // The venue has the order; its acknowledgement will record it.
                tracing::error!(
                    order_id = %order_id,
                    error = %e,
                    "Order submitted but not recorded"
                );
                observability::record_submission("error");
                return Err(e);
            }
        };

        observability::record_submission("submitted");
        tracing::info!(
            order_id = %order_id,
            direction = %request.direction,
            offset = %request.offset,
            volume = request.volume,
            price = %request.price,
            opponent = ?request.opponent.as_ref().map(OrderId::as_str),
            "Order submitted"
        );
        Ok(record)
    }

    async fn check_opponent(&self, opponent: &OrderId) -> Result<(), ReconcileError> {
        let Some(resting) = self.store.find_order(opponent).await? else {
            return Err(ReconcileError::OpponentNotFound {
                order_id: opponent.clone(),
            });
        };
        if let Some(existing) = resting.opponent_order_id() {
            return Err(ReconcileError::DuplicateOpponent {
                order_id: opponent.clone(),
                existing: existing.clone(),
            });
        }
        Ok(())
    }

    async fn record(
        &self,
        order_id: &OrderId,
        request: &SubmitOrderRequest,
        at: Timestamp,
    ) -> Result<OrderRecord, ReconcileError> {
        let mut tx = self.store.begin().await?;
        match Self::stage(&mut tx, order_id, request, at).await {
            Ok(record) => {
                tx.commit().await?;
                Ok(record)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(order_id = %order_id, error = %rollback, "Rollback failed");
                }
                Err(e)
            }
        }
    }

    async fn stage(
        tx: &mut S::Tx,
        order_id: &OrderId,
        request: &SubmitOrderRequest,
        at: Timestamp,
    ) -> Result<OrderRecord, ReconcileError> {
        let mut record = OrderRecord::submitted(
            order_id.clone(),
            request.direction,
            request.offset,
            request.price,
            request.volume,
            at,
        );

        if let Some(opponent) = &request.opponent {
            let Some(mut resting) = tx.find_order(opponent).await? else {
                return Err(ReconcileError::OpponentNotFound {
                    order_id: opponent.clone(),
                });
            };
            if resting.link_opponent(order_id)? {
                tx.update_order(&resting).await?;
            }
            record.link_opponent(opponent)?;
        }

        tx.insert_order(&record).await?;
        Ok(record)
    }
}
