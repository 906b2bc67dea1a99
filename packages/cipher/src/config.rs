//! Cipher session configuration

use crate::CipherAlgorithm;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for the cipher session factory
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherConfig {
    /// Algorithm used for every session
    #[serde(default)]
    pub algorithm: CipherAlgorithm,
    /// How long an authorized session stays usable, in seconds
    #[serde(default = "default_session_validity")]
    pub session_validity_secs: u64,
}

fn default_session_validity() -> u64 {
    30
}

impl CipherConfig {
    /// Validity window as a `Duration`
    #[must_use]
    pub fn session_validity(&self) -> Duration {
        Duration::from_secs(self.session_validity_secs)
    }
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            algorithm: CipherAlgorithm::default(),
            session_validity_secs: default_session_validity(),
        }
    }
}
