//! Error handling for the key module

use thiserror::Error;

/// Key-specific errors
#[derive(Debug, Error)]
pub enum KeyError {
    /// The secure container could not be opened
    #[error("Secure key container unavailable: {reason}")]
    StoreUnavailable {
        /// Reason for unavailability
        reason: String,
    },

    /// The platform permanently invalidated the key
    #[error("Key permanently invalidated: {name}")]
    KeyInvalidated {
        /// Key name
        name: String,
    },

    /// Key not found in the container
    #[error("Key not found: {name}")]
    KeyNotFound {
        /// Key name
        name: String,
    },

    /// Key names must be non-empty
    #[error("Invalid key name: {0:?}")]
    InvalidKeyName(String),

    /// Key generation error occurred
    #[error("Key generation error: {0}")]
    KeyGeneration(String),
}

impl KeyError {
    /// Create a `StoreUnavailable` error
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            reason: reason.into(),
        }
    }

    /// Whether the error means the key can never be used again
    #[must_use]
    pub fn is_invalidation(&self) -> bool {
        matches!(self, Self::KeyInvalidated { .. })
    }
}

/// Result type for key operations
pub type Result<T> = std::result::Result<T, KeyError>;
