//! Error types for the authorization coordinator

use biolock_cipher::{CipherError, InitError};
use biolock_key::KeyError;
use biolock_sensor::{SensorError, UnavailableReason};
use thiserror::Error;

/// Errors returned synchronously by the coordinator
#[derive(Debug, Error)]
pub enum AuthError {
    /// Device cannot do biometric authentication
    #[error("Biometric authentication unavailable: {0}")]
    Unavailable(UnavailableReason),

    /// Key lifecycle failure
    #[error(transparent)]
    Key(#[from] KeyError),

    /// Unexpected cipher construction failure
    #[error(transparent)]
    Init(#[from] InitError),

    /// Cryptographic operation failure
    #[error(transparent)]
    Cipher(#[from] CipherError),

    /// Sensor driver failure
    #[error(transparent)]
    Sensor(#[from] SensorError),

    /// Configuration could not be read
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for coordinator operations
pub type Result<T> = std::result::Result<T, AuthError>;
