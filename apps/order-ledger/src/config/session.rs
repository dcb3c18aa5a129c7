//! Trading session configuration.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::domain::market::{SessionCalendar, SessionWindow};

/// One trading window as configured, times as `HH:MM` or `HH:MM:SS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWindowConfig {
    /// Opening time of day.
    pub open: String,
    /// Closing time of day.
    pub close: String,
}

impl SessionWindowConfig {
    fn new(open: &str, close: &str) -> Self {
        Self {
            open: open.to_string(),
            close: close.to_string(),
        }
    }

    /// Parse into a domain window.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if either time does not parse or both are equal.
    pub fn to_window(&self) -> Result<SessionWindow, ConfigError> {
        let open = parse_time_of_day(&self.open)?;
        let close = parse_time_of_day(&self.close)?;
        if open == close {
            return Err(ConfigError::ValidationError(format!(
                "session window {}-{} is empty",
                self.open, self.close
            )));
        }
        Ok(SessionWindow::new(open, close))
    }
}

fn parse_time_of_day(s: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|e| ConfigError::ValidationError(format!("invalid session time '{s}': {e}")))
}

/// Trading session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Ordered trading windows.
    #[serde(default = "default_windows")]
    pub windows: Vec<SessionWindowConfig>,
    /// Venue local time offset from UTC, in minutes.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// Seconds before a close at which new orders stop (0 disables).
    #[serde(default = "default_close_guard_secs")]
    pub close_guard_secs: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            windows: default_windows(),
            utc_offset_minutes: 0,
            close_guard_secs: default_close_guard_secs(),
        }
    }
}

impl SessionConfig {
    /// Build the session calendar.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any window is invalid.
    pub fn to_calendar(&self) -> Result<SessionCalendar, ConfigError> {
        let windows = self
            .windows
            .iter()
            .map(SessionWindowConfig::to_window)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SessionCalendar::new(
            windows,
            self.utc_offset_minutes,
            self.close_guard_secs,
        ))
    }
}

fn default_windows() -> Vec<SessionWindowConfig> {
    vec![
        SessionWindowConfig::new("21:00", "23:00"),
        SessionWindowConfig::new("09:00", "11:30"),
        SessionWindowConfig::new("13:30", "15:00"),
    ]
}

const fn default_close_guard_secs() -> u32 {
    120
}
