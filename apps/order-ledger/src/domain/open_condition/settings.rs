//! Position and depth limits.

use serde::{Deserialize, Serialize};

/// Limits that gate new opening orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenSettings {
    /// Gross position (long + short) at which opening stops.
    pub max_position: u64,
    /// Volume of each opening order.
    pub volume_per_order: u64,
    /// Resting volume at bid and ask combined that a new order may not reach.
    pub volume_per_price: u64,
}

impl Default for OpenSettings {
    fn default() -> Self {
        Self {
            max_position: 10,
            volume_per_order: 1,
            volume_per_price: 5,
        }
    }
}
