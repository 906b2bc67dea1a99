//! Contracts for the biometric sensor driver and lock screen

use crate::Result;
use biolock_cipher::{AuthToken, OperationId};
use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

/// Raw event from the sensor driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorEvent {
    /// A scan did not match
    FailedAttempt,
    /// A scan was unusable but recoverable
    Help {
        /// Driver-specific help code
        code: i32,
        /// Human-readable hint
        message: String,
    },
    /// Fatal error, lockout or cancellation echo
    Error {
        /// Driver-specific error code
        code: i32,
        /// Human-readable message
        message: String,
    },
    /// A scan matched
    Succeeded(AuthToken),
}

/// Stream of events for one listen
pub type SensorEventStream = BoxStream<'static, SensorEvent>;

/// Biometric sensor driver
pub trait BiometricSensor: Send + Sync {
    /// Sensor hardware detected
    fn is_present(&self) -> bool;

    /// At least one biometric enrolled
    fn has_enrollment(&self) -> bool;

    /// Begin listening for a match that authorizes `operation`.
    ///
    /// Cancelling `cancel` releases the sensor; drivers typically answer
    /// with a final cancellation error on the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver cannot start listening.
    fn authenticate(&self, operation: OperationId, cancel: CancellationToken)
        -> Result<SensorEventStream>;
}

/// Device lock-screen state
pub trait LockScreen: Send + Sync {
    /// A secure lock screen (PIN, pattern, password) is configured
    fn is_secure(&self) -> bool;
}
