//! Error handling for sensor sessions

use crate::UnavailableReason;
use thiserror::Error;

/// Sensor-specific errors
#[derive(Debug, Error)]
pub enum SensorError {
    /// Biometric authentication cannot run on this device right now
    #[error("Biometric authentication unavailable: {0}")]
    Unavailable(UnavailableReason),

    /// `start` was called outside a tokio runtime
    #[error("No async runtime available to drive the sensor")]
    NoRuntime,

    /// The sensor driver refused to start listening
    #[error("Sensor driver error: {0}")]
    Driver(String),
}

/// Result type for sensor operations
pub type Result<T> = std::result::Result<T, SensorError>;
