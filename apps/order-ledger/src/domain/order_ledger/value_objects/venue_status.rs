//! Order status as reported by the venue.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The venue's coarse view of an order: still working or done.
///
/// The venue does not say *why* an order finished; the ledger derives that
/// from the remaining volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VenueStatus {
    /// Order is working on the book.
    Alive,
    /// Order is no longer working (filled, cancelled or both).
    Finished,
}

impl fmt::Display for VenueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alive => write!(f, "ALIVE"),
            Self::Finished => write!(f, "FINISHED"),
        }
    }
}
