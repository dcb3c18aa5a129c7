//! Open Condition Evaluator

use super::settings::OpenSettings;
use crate::domain::market::{BookState, PositionState};

/// Position and depth gate.
///
/// Both limits are hard: either one failing blocks submission for the cycle.
pub struct OpenConditionEvaluator;

impl OpenConditionEvaluator {
    /// Returns true if a new order of `settings.volume_per_order` may open.
    ///
    /// `long + short < max_position` and
    /// `resting(bid) + resting(ask) + volume_per_order < volume_per_price`.
    #[must_use]
    pub fn may_open(settings: &OpenSettings, position: &PositionState, book: &BookState) -> bool {
        Self::position_allows(settings, position) && Self::depth_allows(settings, book)
    }

    /// Position clause of [`Self::may_open`].
    #[must_use]
    pub const fn position_allows(settings: &OpenSettings, position: &PositionState) -> bool {
        position.total() < settings.max_position
    }

    /// Depth clause of [`Self::may_open`].
    #[must_use]
    pub fn depth_allows(settings: &OpenSettings, book: &BookState) -> bool {
        let lots_at_bid = book.resting_volume(book.best_bid());
        let lots_at_ask = book.resting_volume(book.best_ask());
        lots_at_bid
            .saturating_add(lots_at_ask)
            .saturating_add(settings.volume_per_order)
            < settings.volume_per_price
    }
}
