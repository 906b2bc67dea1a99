//! Coordinator configuration

use crate::{AuthError, Result};
use biolock_cipher::CipherConfig;
use biolock_sensor::SensorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Key used by `enroll_default_key`
    #[serde(default = "default_key_name")]
    pub default_key_name: String,
    /// Whether new keys die when the enrolled biometric set changes
    #[serde(default = "default_invalidate_on_new_enrollment")]
    pub invalidate_on_new_enrollment: bool,
    /// Cipher session settings
    #[serde(default)]
    pub cipher: CipherConfig,
    /// Sensor timings and status texts
    #[serde(default)]
    pub sensor: SensorConfig,
}

fn default_key_name() -> String {
    "default_key".to_string()
}

fn default_invalidate_on_new_enrollment() -> bool {
    true
}

impl AuthConfig {
    /// Parse from JSON; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` on malformed JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| AuthError::Config(e.to_string()))
    }

    /// Read a JSON config file
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| AuthError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            default_key_name: default_key_name(),
            invalidate_on_new_enrollment: default_invalidate_on_new_enrollment(),
            cipher: CipherConfig::default(),
            sensor: SensorConfig::default(),
        }
    }
}
