//! Reconciliation Loop
//!
//! Drives one cycle per feed update, in dependency order:
//! ingest feed → reconcile orders → evaluate open condition → submit.
//!
//! # Error handling
//!
//! Fatal errors (see [`ReconcileError::is_fatal`]) and a disconnected feed
//! close the feed and end the loop with `Err`. Every other failure is
//! logged, counted and the loop moves on; a failed event is never retried.
//!
//! Order changes delivered alongside an out-of-session quote are deferred,
//! not dropped: they are reconciled on the next in-session cycle, or at end
//! of stream.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::application::ports::{
    FeedError, FeedUpdate, LedgerObserver, StatusSnapshot, SubmitOrderRequest, VenueFeedPort,
};
use crate::application::services::DepthTracker;
use crate::application::use_cases::{ReconcileOrderUseCase, SubmitOrderUseCase};
use crate::domain::market::{BookState, PositionState, Quote, SessionCalendar};
use crate::domain::open_condition::{OpenConditionEvaluator, OpenSettings};
use crate::domain::order_ledger::{Direction, LedgerStore};
use crate::domain::shared::{OrderId, Timestamp};
use crate::error::ReconcileError;
use crate::observability;

/// Loop parameters.
#[derive(Debug, Clone)]
pub struct LoopSettings {
    /// Trading windows.
    pub calendar: SessionCalendar,
    /// Position and depth limits.
    pub open: OpenSettings,
    /// How long to wait for a feed update before logging a miss.
    pub wait_deadline: Duration,
}

/// State threaded through the decision half of one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleContext {
    /// Book view with this ledger's resting depth.
    pub book: BookState,
    /// Venue position.
    pub position: PositionState,
    /// Feed time the cycle is evaluated at.
    pub at: Timestamp,
    /// Inside a trading window.
    pub in_session: bool,
    /// Inside a window and within the close guard.
    pub about_to_close: bool,
}

impl CycleContext {
    /// Returns true if a new opening order may be submitted.
    #[must_use]
    pub fn may_open(&self, settings: &OpenSettings) -> bool {
        self.in_session
            && !self.about_to_close
            && OpenConditionEvaluator::may_open(settings, &self.position, &self.book)
    }
}

/// How a cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    /// Updates were processed.
    Processed,
    /// No update before the deadline.
    TimedOut,
    /// The feed failed to deliver an update.
    FeedFailed,
    /// The quote moved outside every trading window; nothing was done.
    OutOfSession,
    /// The feed is exhausted and has been closed.
    EndOfStream,
}

/// An order update that could not be applied.
#[derive(Debug)]
pub struct FailedEvent {
    /// Order the update was for.
    pub order_id: OrderId,
    /// Why it failed.
    pub error: ReconcileError,
}

/// Result of one cycle.
#[derive(Debug)]
pub struct CycleReport {
    /// How the cycle ended.
    pub status: CycleStatus,
    /// Order updates applied.
    pub reconciled: usize,
    /// Order updates that failed and were skipped.
    pub failed_events: Vec<FailedEvent>,
    /// Order submitted this cycle.
    pub submitted: Option<OrderId>,
}

impl CycleReport {
    const fn new(status: CycleStatus) -> Self {
        Self {
            status,
            reconciled: 0,
            failed_events: Vec::new(),
            submitted: None,
        }
    }
}

/// Totals over a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopSummary {
    /// Cycles run, including timeouts.
    pub cycles: u64,
    /// Feed waits that hit the deadline.
    pub timeouts: u64,
    /// Cycles skipped outside trading windows.
    pub out_of_session: u64,
    /// Order updates applied.
    pub reconciled: u64,
    /// Order updates that failed.
    pub failed_events: u64,
    /// Orders submitted.
    pub submitted: Vec<OrderId>,
}

impl LoopSummary {
    fn absorb(&mut self, report: &CycleReport) {
        self.cycles += 1;
        match report.status {
            CycleStatus::TimedOut => self.timeouts += 1,
            CycleStatus::OutOfSession => self.out_of_session += 1,
            _ => {}
        }
        self.reconciled += report.reconciled as u64;
        self.failed_events += report.failed_events.len() as u64;
        if let Some(id) = &report.submitted {
            self.submitted.push(id.clone());
        }
    }
}

/// Single-threaded driver tying the feed to the ledger.
pub struct ReconciliationLoop<F, S, O>
where
    F: VenueFeedPort,
    S: LedgerStore,
    O: LedgerObserver,
{
    feed: F,
    store: Arc<S>,
    observer: Arc<O>,
    reconcile: ReconcileOrderUseCase<S, O>,
    submit: SubmitOrderUseCase<S>,
    settings: LoopSettings,
    quote: Option<Quote>,
    deferred: BTreeSet<OrderId>,
    summary: LoopSummary,
}

impl<F, S, O> ReconciliationLoop<F, S, O>
where
    F: VenueFeedPort,
    S: LedgerStore,
    O: LedgerObserver,
{
    /// Create a loop over `feed`.
    pub fn new(feed: F, store: Arc<S>, observer: Arc<O>, settings: LoopSettings) -> Self {
        Self {
            reconcile: ReconcileOrderUseCase::new(Arc::clone(&store), Arc::clone(&observer)),
            submit: SubmitOrderUseCase::new(Arc::clone(&store)),
            feed,
            store,
            observer,
            settings,
            quote: None,
            deferred: BTreeSet::new(),
            summary: LoopSummary::default(),
        }
    }

    /// The feed being driven.
    pub const fn feed(&self) -> &F {
        &self.feed
    }

    /// Orders whose changes arrived outside a trading session and are
    /// still waiting to be reconciled.
    pub const fn deferred(&self) -> &BTreeSet<OrderId> {
        &self.deferred
    }

    /// Totals so far.
    pub const fn summary(&self) -> &LoopSummary {
        &self.summary
    }

    /// Run until the feed signals end of stream.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error, or `Feed` once the feed disconnects;
    /// the feed is closed before returning.
    pub async fn run(&mut self) -> Result<LoopSummary, ReconcileError> {
        tracing::info!("Reconciliation loop started");
        loop {
            let report = self.run_cycle().await?;
            self.summary.absorb(&report);
            if report.status == CycleStatus::EndOfStream {
                tracing::info!(
                    cycles = self.summary.cycles,
                    reconciled = self.summary.reconciled,
                    failed = self.summary.failed_events,
                    submitted = self.summary.submitted.len(),
                    "Reconciliation loop finished"
                );
                return Ok(self.summary.clone());
            }
        }
    }

    /// Run one cycle.
    ///
    /// # Errors
    ///
    /// Returns a fatal error or a disconnected feed after closing the feed.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, ReconcileError> {
        let deadline = self.settings.wait_deadline;
        let update = match tokio::time::timeout(deadline, self.feed.next_update()).await {
            Err(_) => {
                let err = ReconcileError::FeedTimeout { waited: deadline };
                tracing::warn!(error = %err, "Feed wait deadline elapsed");
                observability::record_feed_timeout();
                return Ok(CycleReport::new(CycleStatus::TimedOut));
            }
            Ok(Err(e)) => {
                let disconnected = matches!(e, FeedError::Disconnected);
                let err = ReconcileError::from(e);
                observability::record_reconcile_failure(err.kind());
                if disconnected {
                    tracing::error!(error = %err, "Feed disconnected, halting");
                    self.close_feed().await;
                    return Err(err);
                }
                tracing::warn!(error = %err, "Feed update failed");
                // A failing feed may return immediately; wait out the deadline
                // before the next attempt.
                tokio::time::sleep(deadline).await;
                return Ok(CycleReport::new(CycleStatus::FeedFailed));
            }
            Ok(Ok(update)) => update,
        };

        let changes = match update {
            FeedUpdate::EndOfStream => {
                tracing::info!("Feed reached end of stream");
                let mut report = CycleReport::new(CycleStatus::EndOfStream);
                if !self.deferred.is_empty() {
                    tracing::info!(
                        deferred = self.deferred.len(),
                        "Reconciling order changes deferred outside session"
                    );
                    let orders = std::mem::take(&mut self.deferred);
                    self.reconcile_orders(&orders, &mut report).await?;
                }
                self.close_feed().await;
                return Ok(report);
            }
            FeedUpdate::Changed(changes) => changes,
        };

        let started = Instant::now();
        if changes.quote && !self.refresh_quote() {
            if !changes.orders.is_empty() {
                tracing::info!(
                    orders = changes.orders.len(),
                    "Deferring order changes until the session opens"
                );
                self.deferred.extend(changes.orders);
            }
            return Ok(CycleReport::new(CycleStatus::OutOfSession));
        }

        let mut orders = std::mem::take(&mut self.deferred);
        orders.extend(changes.orders);

        let mut report = CycleReport::new(CycleStatus::Processed);
        self.reconcile_orders(&orders, &mut report).await?;

        if report.failed_events.is_empty() {
            report.submitted = self.maybe_submit().await;
        } else {
            tracing::warn!(
                failed = report.failed_events.len(),
                "Skipping open condition after failed events"
            );
        }

        observability::record_cycle_duration(started.elapsed().as_secs_f64());
        Ok(report)
    }

    /// Take the feed's latest quote. Returns false when it lies outside
    /// every trading window.
    fn refresh_quote(&mut self) -> bool {
        let Some(quote) = self.feed.current_quote() else {
            return true;
        };
        self.quote = Some(quote);

        if !self.settings.calendar.is_trading_time(quote.at) {
            tracing::debug!(at = %quote.at, "Outside trading session, skipping cycle");
            return false;
        }

        self.observer.on_status(&StatusSnapshot {
            at: quote.at,
            best_bid: quote.best_bid,
            best_ask: quote.best_ask,
            position: self.feed.position(),
        });
        true
    }

    async fn reconcile_orders(
        &mut self,
        orders: &BTreeSet<OrderId>,
        report: &mut CycleReport,
    ) -> Result<(), ReconcileError> {
        let at = self.quote.map_or_else(Timestamp::now, |q| q.at);

        for order_id in orders {
            let Some(update) = self.feed.current_orders().get(order_id).cloned() else {
                tracing::debug!(order_id = %order_id, "Changed order has no snapshot");
                continue;
            };

            match self.reconcile.execute(&update, at).await {
                Ok(_) => report.reconciled += 1,
                Err(e) if e.is_fatal() => {
                    tracing::error!(
                        order_id = %order_id,
                        error = %e,
                        "Fatal ledger inconsistency, halting"
                    );
                    observability::record_reconcile_failure(e.kind());
                    self.close_feed().await;
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(order_id = %order_id, error = %e, "Order update failed");
                    observability::record_reconcile_failure(e.kind());
                    report.failed_events.push(FailedEvent {
                        order_id: order_id.clone(),
                        error: e,
                    });
                }
            }
        }
        Ok(())
    }

    /// Build this cycle's decision context, if a quote is known.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceFailure` if the resting orders cannot be listed.
    pub async fn cycle_context(&self) -> Result<Option<CycleContext>, ReconcileError> {
        let Some(quote) = self.quote else {
            return Ok(None);
        };
        let resting = self.store.list_alive_orders().await?;
        observability::update_resting_orders(resting.len());

        let book = DepthTracker::from_orders(&resting).into_book_state(quote);
        let calendar = &self.settings.calendar;
        Ok(Some(CycleContext {
            book,
            position: self.feed.position(),
            at: quote.at,
            in_session: calendar.is_trading_time(quote.at),
            about_to_close: calendar.is_about_to_close(quote.at),
        }))
    }

    async fn maybe_submit(&mut self) -> Option<OrderId> {
        let ctx = match self.cycle_context().await {
            Ok(Some(ctx)) => ctx,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Could not build cycle context");
                observability::record_reconcile_failure(e.kind());
                return None;
            }
        };

        if !ctx.may_open(&self.settings.open) {
            return None;
        }

        let request = SubmitOrderRequest::open(
            Direction::Buy,
            self.settings.open.volume_per_order,
            ctx.book.best_bid(),
        );
        match self.submit.execute(&mut self.feed, &request, ctx.at).await {
            Ok(record) => Some(record.order_id().clone()),
            Err(e) => {
                tracing::warn!(error = %e, "Order submission failed");
                observability::record_reconcile_failure(e.kind());
                None
            }
        }
    }

    async fn close_feed(&mut self) {
        if let Err(e) = self.feed.close().await {
            tracing::warn!(error = %e, "Failed to close feed");
        }
    }
}
