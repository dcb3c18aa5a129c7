//! Ledger persistence configuration.

use serde::{Deserialize, Serialize};

/// Ledger persistence configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// JSON snapshot loaded at start and written at exit. No snapshot when unset.
    #[serde(default)]
    pub snapshot_path: Option<String>,
}
