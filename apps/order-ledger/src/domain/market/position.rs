//! Position as reported by the venue.

use serde::{Deserialize, Serialize};

/// Long and short position counts for the traded instrument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionState {
    /// Long lots held.
    #[serde(default)]
    pub long: u64,
    /// Short lots held.
    #[serde(default)]
    pub short: u64,
}

impl PositionState {
    /// Create a position.
    #[must_use]
    pub const fn new(long: u64, short: u64) -> Self {
        Self { long, short }
    }

    /// Gross position, long plus short.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.long.saturating_add(self.short)
    }
}
