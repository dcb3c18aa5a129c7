//! Configuration module for the order ledger.
//!
//! Provides configuration loading, validation, and environment variable
//! interpolation for the reconciliation loop and its adapters.
//!
//! # Usage
//!
//! ```rust,ignore
//! use order_ledger::config::{Config, load_config};
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Build loop parameters
//! let settings = config.loop_settings()?;
//! ```

mod feed;
mod limits;
mod observability;
mod persistence;
mod session;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use feed::FeedConfig;
pub use limits::LimitsConfig;
pub use observability::{LoggingConfig, ObservabilityConfig};
pub use persistence::PersistenceConfig;
pub use session::{SessionConfig, SessionWindowConfig};

use crate::application::services::LoopSettings;

/// Largest accepted UTC offset, in minutes.
const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Trading sessions.
    #[serde(default)]
    pub session: SessionConfig,
    /// Position and depth limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Venue feed.
    #[serde(default)]
    pub feed: FeedConfig,
    /// Ledger persistence.
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Logging and metrics.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Build the reconciliation loop parameters.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if a session window is invalid.
    pub fn loop_settings(&self) -> Result<LoopSettings, ConfigError> {
        Ok(LoopSettings {
            calendar: self.session.to_calendar()?,
            open: self.limits.to_open_settings(),
            wait_deadline: self.feed.wait_deadline(),
        })
    }
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map(|m| m.as_str());
        match cap.get(1).map(|m| std::env::var(m.as_str())) {
            Some(Ok(v)) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.session.windows.is_empty() {
        return Err(ConfigError::ValidationError(
            "session.windows must not be empty".to_string(),
        ));
    }
    for window in &config.session.windows {
        window.to_window()?;
    }
    if config.session.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
        return Err(ConfigError::ValidationError(
            "session.utc_offset_minutes must be within +/-1080".to_string(),
        ));
    }

    let limits = &config.limits;
    if limits.max_position == 0 {
        return Err(ConfigError::ValidationError(
            "limits.max_position must be positive".to_string(),
        ));
    }
    if limits.volume_per_order == 0 {
        return Err(ConfigError::ValidationError(
            "limits.volume_per_order must be positive".to_string(),
        ));
    }
    if limits.volume_per_price <= limits.volume_per_order {
        return Err(ConfigError::ValidationError(
            "limits.volume_per_price must exceed limits.volume_per_order".to_string(),
        ));
    }

    if config.feed.wait_deadline_ms == 0 {
        return Err(ConfigError::ValidationError(
            "feed.wait_deadline_ms must be positive".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = load_config_from_string("{}").unwrap();
        assert_eq!(config.session.windows.len(), 3);
        assert_eq!(config.session.close_guard_secs, 120);
        assert_eq!(config.limits.max_position, 10);
        assert_eq!(config.limits.volume_per_order, 1);
        assert_eq!(config.limits.volume_per_price, 5);
        assert_eq!(config.feed.wait_deadline(), Duration::from_secs(5));
        assert!(config.persistence.snapshot_path.is_none());
        assert!(config.observability.metrics_port.is_none());
    }

    #[test]
    fn test_load_full_config() {
        let yaml = r#"
session:
  windows:
    - { open: "09:00", close: "10:15" }
    - { open: "21:00:00", close: "02:30:00" }
  utc_offset_minutes: 480
  close_guard_secs: 60
limits:
  max_position: 4
  volume_per_order: 2
  volume_per_price: 8
feed:
  wait_deadline_ms: 250
  replay_path: data/c2101.jsonl
persistence:
  snapshot_path: data/ledger.json
observability:
  metrics_port: 9100
"#;
        let config = load_config_from_string(yaml).unwrap();
        let settings = config.loop_settings().unwrap();
        assert_eq!(settings.calendar.windows().len(), 2);
        assert_eq!(settings.open.volume_per_price, 8);
        assert_eq!(settings.wait_deadline, Duration::from_millis(250));
        assert_eq!(config.feed.replay_path.as_deref(), Some("data/c2101.jsonl"));
        assert_eq!(config.observability.metrics_port, Some(9100));
    }

    #[test]
    fn test_env_var_with_default_when_missing() {
        let input = "path: ${ORDER_LEDGER_TEST_NONEXISTENT_VAR:-ticks.jsonl}";
        assert_eq!(interpolate_env_vars(input), "path: ticks.jsonl");
    }

    #[test]
    #[expect(clippy::literal_string_with_formatting_args)] // ${...} is env var syntax, not format args
    fn test_env_var_with_default_uses_existing() {
        // PATH should always exist
        let result = interpolate_env_vars("path: ${PATH:-default}");
        assert_ne!(result, "path: default");
        assert!(result.starts_with("path: "));
    }

    #[test]
    fn test_env_var_without_default_becomes_empty() {
        let input = "level: ${ORDER_LEDGER_TEST_UNLIKELY_TO_EXIST}";
        assert_eq!(interpolate_env_vars(input), "level: ");
    }

    #[test]
    fn test_validation_rejects_bad_session_time() {
        let yaml = r#"
session:
  windows:
    - { open: "25:00", close: "26:00" }
"#;
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for invalid session time");
        };
        assert!(err.to_string().contains("25:00"));
    }

    #[test]
    fn test_validation_rejects_empty_windows() {
        let Err(err) = load_config_from_string("session:\n  windows: []\n") else {
            panic!("expected error for empty windows");
        };
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_validation_rejects_unreachable_depth_limit() {
        let yaml = "limits:\n  volume_per_order: 5\n  volume_per_price: 5\n";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for depth limit");
        };
        assert!(err.to_string().contains("volume_per_price"));
    }

    #[test]
    fn test_validation_rejects_zero_deadline() {
        let Err(err) = load_config_from_string("feed:\n  wait_deadline_ms: 0\n") else {
            panic!("expected error for zero deadline");
        };
        assert!(err.to_string().contains("wait_deadline_ms"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config(Some("/nonexistent/order-ledger.yaml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "limits:\n  max_position: 3\n").unwrap();
        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.limits.max_position, 3);
    }
}
