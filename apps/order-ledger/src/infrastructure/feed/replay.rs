//! Replay feed.
//!
//! Plays back recorded venue updates from a JSON Lines file, one frame per
//! update. Each frame may carry a quote, order snapshots and a position.
//!
//! ```text
//! {"quote":{"best_bid":"2380","best_ask":"2381","at":"2020-11-02T01:00:00Z"}}
//! {"delay_ms":50,"orders":[{"order_id":"O1", ...}]}
//! ```
//!
//! Orders submitted through the feed are acknowledged as ALIVE snapshots on
//! the next update. End of input is end of stream.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::application::ports::{
    ChangeSet, FeedError, FeedUpdate, SubmitOrderRequest, VenueFeedPort,
};
use crate::domain::market::{PositionState, Quote};
use crate::domain::order_ledger::{OrderUpdate, VenueStatus};
use crate::domain::shared::{OrderId, Timestamp};

/// One recorded feed update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedFrame {
    /// Delay before the frame is delivered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,
    /// New quote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<Quote>,
    /// Order snapshots.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orders: Vec<OrderUpdate>,
    /// New position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionState>,
}

/// Feed that replays recorded frames.
#[derive(Debug, Default)]
pub struct ReplayFeed {
    frames: VecDeque<FeedFrame>,
    ready_at: Option<Instant>,
    quote: Option<Quote>,
    orders: BTreeMap<OrderId, OrderUpdate>,
    position: PositionState,
    pending_acks: Vec<OrderUpdate>,
    submitted: Vec<(OrderId, SubmitOrderRequest)>,
    closed: bool,
}

impl ReplayFeed {
    /// Create a feed over in-memory frames.
    #[must_use]
    pub fn from_frames(frames: Vec<FeedFrame>) -> Self {
        Self {
            frames: frames.into(),
            ..Self::default()
        }
    }

    /// Load frames from a JSON Lines file. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read and `Malformed` for the first
    /// line that is not a valid frame.
    pub fn from_path(path: &Path) -> Result<Self, FeedError> {
        let contents = std::fs::read_to_string(path).map_err(|e| FeedError::Io {
            message: format!("failed to read '{}': {e}", path.display()),
        })?;
        Self::from_jsonl(&contents)
    }

    /// Parse frames from JSON Lines text.
    ///
    /// # Errors
    ///
    /// Returns `Malformed` for the first line that is not a valid frame.
    pub fn from_jsonl(contents: &str) -> Result<Self, FeedError> {
        let frames = contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str::<FeedFrame>(line).map_err(|e| FeedError::Malformed {
                    line: idx + 1,
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_frames(frames))
    }

    /// Orders submitted so far, in submission order.
    #[must_use]
    pub fn submitted(&self) -> &[(OrderId, SubmitOrderRequest)] {
        &self.submitted
    }

    /// Frames not yet delivered.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    /// Returns true once `close` has been called.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    fn apply_order(&mut self, update: OrderUpdate, changes: &mut ChangeSet) {
        if self.orders.get(&update.order_id) != Some(&update) {
            changes.orders.insert(update.order_id.clone());
            self.orders.insert(update.order_id.clone(), update);
        }
    }

    fn apply_frame(&mut self, frame: FeedFrame) -> ChangeSet {
        let mut changes = ChangeSet {
            quote: false,
            orders: BTreeSet::new(),
        };

        for ack in std::mem::take(&mut self.pending_acks) {
            self.apply_order(ack, &mut changes);
        }
        if let Some(quote) = frame.quote {
            changes.quote = self.quote.is_none_or(|prev| prev.prices_differ(&quote));
            self.quote = Some(quote);
        }
        for update in frame.orders {
            self.apply_order(update, &mut changes);
        }
        if let Some(position) = frame.position {
            self.position = position;
        }
        changes
    }
}

#[async_trait]
impl VenueFeedPort for ReplayFeed {
    async fn next_update(&mut self) -> Result<FeedUpdate, FeedError> {
        if self.closed {
            return Err(FeedError::Disconnected);
        }

        let Some(delay_ms) = self.frames.front().map(|f| f.delay_ms) else {
            if self.pending_acks.is_empty() {
                return Ok(FeedUpdate::EndOfStream);
            }
            return Ok(FeedUpdate::Changed(self.apply_frame(FeedFrame::default())));
        };

        if let Some(ms) = delay_ms {
            // Keep the deadline across cancelled waits so a timeout does not
            // restart the delay.
            let ready_at = *self
                .ready_at
                .get_or_insert_with(|| Instant::now() + Duration::from_millis(ms));
            tokio::time::sleep_until(ready_at).await;
        }
        self.ready_at = None;

        match self.frames.pop_front() {
            Some(frame) => Ok(FeedUpdate::Changed(self.apply_frame(frame))),
            None => Ok(FeedUpdate::EndOfStream),
        }
    }

    fn current_quote(&self) -> Option<Quote> {
        self.quote
    }

    fn current_orders(&self) -> &BTreeMap<OrderId, OrderUpdate> {
        &self.orders
    }

    fn position(&self) -> PositionState {
        self.position
    }

    async fn submit_order(&mut self, request: &SubmitOrderRequest) -> Result<OrderId, FeedError> {
        if self.closed {
            return Err(FeedError::Disconnected);
        }
        if request.volume == 0 {
            return Err(FeedError::SubmitRejected {
                reason: "volume must be positive".to_string(),
            });
        }
        if !request.price.is_positive() {
            return Err(FeedError::SubmitRejected {
                reason: format!("price must be positive, got {}", request.price),
            });
        }

        let order_id = OrderId::generate();
        let insert_time = self.quote.map_or_else(Timestamp::now, |q| q.at);
        self.pending_acks.push(OrderUpdate {
            order_id: order_id.clone(),
            direction: request.direction,
            offset: request.offset,
            limit_price: request.price,
            volume_original: request.volume,
            volume_left: request.volume,
            status: VenueStatus::Alive,
            insert_time,
            trades: vec![],
        });
        self.submitted.push((order_id.clone(), request.clone()));
        Ok(order_id)
    }

    async fn close(&mut self) -> Result<(), FeedError> {
        if !self.closed {
            tracing::info!(remaining = self.frames.len(), "Replay feed closed");
        }
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_ledger::Direction;
    use crate::domain::shared::Price;

    fn quote(bid: i64, at: &str) -> Quote {
        Quote {
            best_bid: Price::from_i64(bid),
            best_ask: Price::from_i64(bid + 1),
            at: Timestamp::parse(at).unwrap(),
        }
    }

    #[tokio::test]
    async fn quote_change_is_flagged_only_when_prices_move() {
        let mut feed = ReplayFeed::from_frames(vec![
            FeedFrame {
                quote: Some(quote(2380, "2020-11-02T01:00:00Z")),
                ..FeedFrame::default()
            },
            FeedFrame {
                quote: Some(quote(2380, "2020-11-02T01:00:01Z")),
                ..FeedFrame::default()
            },
        ]);

        let FeedUpdate::Changed(first) = feed.next_update().await.unwrap() else {
            panic!("expected change");
        };
        assert!(first.quote);
        let FeedUpdate::Changed(second) = feed.next_update().await.unwrap() else {
            panic!("expected change");
        };
        assert!(!second.quote);
        assert_eq!(feed.current_quote().unwrap().at.to_string(), "2020-11-02T01:00:01+00:00");
        assert_eq!(feed.next_update().await.unwrap(), FeedUpdate::EndOfStream);
    }

    #[tokio::test]
    async fn submitted_orders_are_acknowledged_next_update() {
        let mut feed = ReplayFeed::from_frames(vec![]);
        let request = SubmitOrderRequest::open(Direction::Buy, 1, Price::from_i64(2380));
        let id = feed.submit_order(&request).await.unwrap();

        let FeedUpdate::Changed(changes) = feed.next_update().await.unwrap() else {
            panic!("expected acknowledgement");
        };
        assert!(changes.orders.contains(&id));
        assert_eq!(feed.current_orders()[&id].status, VenueStatus::Alive);
        assert_eq!(feed.next_update().await.unwrap(), FeedUpdate::EndOfStream);
    }

    #[tokio::test]
    async fn unpriced_submission_is_rejected() {
        let mut feed = ReplayFeed::from_frames(vec![]);
        let request = SubmitOrderRequest::open(Direction::Buy, 1, Price::from_i64(0));

        let err = feed.submit_order(&request).await.unwrap_err();

        assert!(matches!(err, FeedError::SubmitRejected { .. }));
        assert!(feed.submitted().is_empty());
        assert_eq!(feed.next_update().await.unwrap(), FeedUpdate::EndOfStream);
    }

    #[tokio::test]
    async fn identical_snapshot_is_not_a_change() {
        let line = r#"{"orders":[{"order_id":"O1","direction":"BUY","offset":"OPEN","limit_price":"2380","volume_original":5,"volume_left":5,"status":"ALIVE","insert_time":"2020-11-02T01:00:00Z"}]}"#;
        let mut feed = ReplayFeed::from_jsonl(&format!("{line}\n\n{line}\n")).unwrap();
        assert_eq!(feed.remaining(), 2);

        let FeedUpdate::Changed(first) = feed.next_update().await.unwrap() else {
            panic!("expected change");
        };
        assert_eq!(first.orders.len(), 1);
        let FeedUpdate::Changed(second) = feed.next_update().await.unwrap() else {
            panic!("expected change");
        };
        assert!(second.is_empty());
    }

    #[test]
    fn loads_frames_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.jsonl");
        std::fs::write(
            &path,
            "{\"quote\":{\"best_bid\":\"2380\",\"best_ask\":\"2381\",\"at\":\"2020-11-02T01:00:00Z\"}}\n{\"position\":{\"long\":2}}\n",
        )
        .unwrap();

        let feed = ReplayFeed::from_path(&path).unwrap();
        assert_eq!(feed.remaining(), 2);
        assert!(matches!(
            ReplayFeed::from_path(&dir.path().join("missing.jsonl")),
            Err(FeedError::Io { .. })
        ));
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let err = ReplayFeed::from_jsonl("{}\nnot json\n").unwrap_err();
        assert!(matches!(err, FeedError::Malformed { line: 2, .. }));
    }

    #[tokio::test]
    async fn delayed_frame_survives_cancelled_wait() {
        let mut feed = ReplayFeed::from_frames(vec![FeedFrame {
            delay_ms: Some(50),
            position: Some(PositionState::new(1, 0)),
            ..FeedFrame::default()
        }]);

        let waited = tokio::time::timeout(Duration::from_millis(5), feed.next_update()).await;
        assert!(waited.is_err());
        assert_eq!(feed.remaining(), 1);

        let update = feed.next_update().await.unwrap();
        assert!(matches!(update, FeedUpdate::Changed(_)));
        assert_eq!(feed.position(), PositionState::new(1, 0));
    }

    #[tokio::test]
    async fn closed_feed_rejects_calls() {
        let mut feed = ReplayFeed::from_frames(vec![]);
        feed.close().await.unwrap();
        assert!(feed.is_closed());
        assert_eq!(feed.next_update().await.unwrap_err(), FeedError::Disconnected);
    }
}
