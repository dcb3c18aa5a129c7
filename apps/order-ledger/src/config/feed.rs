//! Venue feed configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Venue feed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// How long to wait for an update before logging a miss, in milliseconds.
    #[serde(default = "default_wait_deadline_ms")]
    pub wait_deadline_ms: u64,
    /// JSON Lines file of recorded updates to replay.
    #[serde(default)]
    pub replay_path: Option<String>,
    /// Instrument label attached to log events.
    #[serde(default = "default_instrument")]
    pub instrument: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            wait_deadline_ms: default_wait_deadline_ms(),
            replay_path: None,
            instrument: default_instrument(),
        }
    }
}

impl FeedConfig {
    /// Wait deadline as a `Duration`.
    #[must_use]
    pub const fn wait_deadline(&self) -> Duration {
        Duration::from_millis(self.wait_deadline_ms)
    }
}

const fn default_wait_deadline_ms() -> u64 {
    5_000
}

fn default_instrument() -> String {
    "DCE.c2101".to_string()
}
