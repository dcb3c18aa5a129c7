//! Position and depth limits.

use serde::{Deserialize, Serialize};

use crate::domain::open_condition::OpenSettings;

/// Limits gating new opening orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Gross position at which opening stops.
    #[serde(default = "default_max_position")]
    pub max_position: u64,
    /// Volume of each opening order.
    #[serde(default = "default_volume_per_order")]
    pub volume_per_order: u64,
    /// Combined resting volume at bid and ask a new order may not reach.
    #[serde(default = "default_volume_per_price")]
    pub volume_per_price: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_position: default_max_position(),
            volume_per_order: default_volume_per_order(),
            volume_per_price: default_volume_per_price(),
        }
    }
}

impl LimitsConfig {
    /// Domain settings for the open-condition evaluator.
    #[must_use]
    pub const fn to_open_settings(&self) -> OpenSettings {
        OpenSettings {
            max_position: self.max_position,
            volume_per_order: self.volume_per_order,
            volume_per_price: self.volume_per_price,
        }
    }
}

const fn default_max_position() -> u64 {
    10
}

const fn default_volume_per_order() -> u64 {
    1
}

const fn default_volume_per_price() -> u64 {
    5
}
