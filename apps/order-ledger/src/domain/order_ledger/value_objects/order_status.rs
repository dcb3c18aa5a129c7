//! Order status in the ledger lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ledger status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Working with nothing filled.
    Alive,
    /// Working with some volume filled.
    PartialFill,
    /// Completely filled.
    FullFill,
    /// Finished with some volume filled and the rest cancelled.
    PartialCancel,
    /// Cancelled with nothing filled.
    FullCancel,
}

impl OrderStatus {
    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::FullFill | Self::FullCancel)
    }

    /// Returns true if the order still rests on the book and contributes depth.
    #[must_use]
    pub const fn is_resting(&self) -> bool {
        matches!(self, Self::Alive | Self::PartialFill)
    }

    /// Returns true if the venue has finished with the order.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        !self.is_resting()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Alive => "ALIVE",
            Self::PartialFill => "PARTIAL_FILL",
            Self::FullFill => "FULL_FILL",
            Self::PartialCancel => "PARTIAL_CANCEL",
            Self::FullCancel => "FULL_CANCEL",
        };
        write!(f, "{s}")
    }
}
