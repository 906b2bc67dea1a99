//! Sensor session timing and status texts

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settle delays and status messages for sensor sessions
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Delay between a fatal sensor error and the fallback outcome
    #[serde(default = "default_error_settle_ms")]
    pub error_settle_ms: u64,
    /// Delay between a match and the authenticated outcome
    #[serde(default = "default_success_settle_ms")]
    pub success_settle_ms: u64,
    /// How long a warning stays before reverting to the hint
    #[serde(default = "default_status_reset_ms")]
    pub status_reset_ms: u64,
    /// Neutral status text
    #[serde(default = "default_hint_message")]
    pub hint_message: String,
    /// Status text for a scan that did not match
    #[serde(default = "default_not_recognized_message")]
    pub not_recognized_message: String,
    /// Status text for a match
    #[serde(default = "default_success_message")]
    pub success_message: String,
}

fn default_error_settle_ms() -> u64 {
    1600
}

fn default_success_settle_ms() -> u64 {
    1300
}

fn default_status_reset_ms() -> u64 {
    1600
}

fn default_hint_message() -> String {
    "Touch sensor".to_string()
}

fn default_not_recognized_message() -> String {
    "Fingerprint not recognized. Try again".to_string()
}

fn default_success_message() -> String {
    "Fingerprint recognized".to_string()
}

impl SensorConfig {
    /// Error settle delay
    #[must_use]
    pub fn error_settle(&self) -> Duration {
        Duration::from_millis(self.error_settle_ms)
    }

    /// Success settle delay
    #[must_use]
    pub fn success_settle(&self) -> Duration {
        Duration::from_millis(self.success_settle_ms)
    }

    /// Status reset window
    #[must_use]
    pub fn status_reset(&self) -> Duration {
        Duration::from_millis(self.status_reset_ms)
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            error_settle_ms: default_error_settle_ms(),
            success_settle_ms: default_success_settle_ms(),
            status_reset_ms: default_status_reset_ms(),
            hint_message: default_hint_message(),
            not_recognized_message: default_not_recognized_message(),
            success_message: default_success_message(),
        }
    }
}
