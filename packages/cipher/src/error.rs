//! Error handling for cipher sessions

use crate::session::CipherMode;
use thiserror::Error;

/// Why a cipher session could not be opened
#[derive(Debug, Error)]
pub enum InitError {
    /// The key was permanently invalidated (enrollment or lock screen changed).
    /// Not retryable for this key.
    #[error("Key permanently invalidated: {key_name}")]
    KeyInvalidated {
        /// Name of the invalidated key
        key_name: String,
    },

    /// Store or crypto provider failure; a defect, not an expected outcome
    #[error("Failed to init cipher: {0}")]
    Fatal(String),
}

impl InitError {
    /// Whether the caller should fall back to a non-biometric path
    #[must_use]
    pub fn is_key_invalidated(&self) -> bool {
        matches!(self, Self::KeyInvalidated { .. })
    }
}

/// Cipher-specific errors
#[derive(Debug, Error)]
pub enum CipherError {
    /// The session has not been authorized by a live biometric match
    #[error("Cipher session not authorized")]
    NotAuthorized,

    /// The authorization token belongs to another operation
    #[error("Authorization token does not match this operation")]
    TokenMismatch,

    /// The session was already used, revoked, or outlived its validity
    #[error("Cipher session is stale: {0}")]
    SessionStale(String),

    /// The session was opened for the other direction
    #[error("Cipher session opened for {actual}, not {expected}")]
    WrongMode {
        /// Mode the call needs
        expected: CipherMode,
        /// Mode the session was opened with
        actual: CipherMode,
    },

    /// Invalid key length provided
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Invalid nonce length provided
    #[error("Invalid nonce length: expected {expected}, got {actual}")]
    InvalidNonceLength {
        /// Expected nonce length in bytes
        expected: usize,
        /// Actual nonce length in bytes
        actual: usize,
    },

    /// The cryptographic operation itself failed after authorization
    #[error("Cryptographic operation failed: {0}")]
    CryptoOperation(String),

    /// Invalid encrypted data provided
    #[error("Invalid encrypted data: {0}")]
    InvalidEncryptedData(String),

    /// Unsupported cryptographic algorithm
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

impl CipherError {
    /// Whether this is a failure of the primitive rather than of authorization
    #[must_use]
    pub fn is_operation_failure(&self) -> bool {
        matches!(
            self,
            Self::CryptoOperation(_) | Self::InvalidEncryptedData(_) | Self::InvalidNonceLength { .. }
        )
    }
}

impl From<hex::FromHexError> for CipherError {
    fn from(err: hex::FromHexError) -> Self {
        CipherError::InvalidEncryptedData(format!("Hex decode error: {err}"))
    }
}

impl From<base64::DecodeError> for CipherError {
    fn from(err: base64::DecodeError) -> Self {
        CipherError::InvalidEncryptedData(format!("Base64 decode error: {err}"))
    }
}

/// Result type for cipher operations
pub type Result<T> = std::result::Result<T, CipherError>;
