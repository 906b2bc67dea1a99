//! Terminal outcome of an authorization attempt

use biolock_cipher::CipherSession;
use biolock_sensor::UnavailableReason;
use std::fmt;

/// Why the caller should switch to a non-biometric credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// Device cannot do biometric authentication
    Unavailable(UnavailableReason),
    /// The key was invalidated by the platform and must be re-created
    KeyInvalidated,
    /// The sensor reported a fatal error or lockout
    SensorError {
        /// Message from the sensor
        message: String,
    },
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "{reason}"),
            Self::KeyInvalidated => write!(f, "key invalidated by enrollment change"),
            Self::SensorError { message } => write!(f, "sensor error: {message}"),
        }
    }
}

/// Exactly one of these ends every authorization attempt
#[derive(Debug)]
pub enum AuthOutcome {
    /// Live match; the session may perform one operation
    Authenticated {
        /// Authorized single-use session
        cipher_session: CipherSession,
    },
    /// Biometric path failed; use the fallback credential
    FallbackRequested(FallbackReason),
    /// Abandoned by the caller
    Cancelled,
}

impl AuthOutcome {
    /// Whether the attempt authenticated
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// Fallback reason, if any
    #[must_use]
    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            Self::FallbackRequested(reason) => Some(reason),
            _ => None,
        }
    }
}
