//! Cipher algorithm definitions and metadata

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported cipher algorithms
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CipherAlgorithm {
    /// AES-256-GCM
    ///
    /// - 256-bit key size
    /// - 96-bit nonce
    /// - 128-bit authentication tag
    #[default]
    #[serde(rename = "aes256gcm")]
    Aes256Gcm,

    /// AES-128-GCM, for keys created with a 128-bit policy
    #[serde(rename = "aes128gcm")]
    Aes128Gcm,

    /// ChaCha20-Poly1305
    ///
    /// - 256-bit key size
    /// - 96-bit nonce
    /// - Constant-time implementation
    #[serde(rename = "chacha20poly1305")]
    ChaCha20Poly1305,
}

impl CipherAlgorithm {
    /// Get the human-readable name of the algorithm
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Aes256Gcm => "AES-256-GCM",
            Self::Aes128Gcm => "AES-128-GCM",
            Self::ChaCha20Poly1305 => "ChaCha20-Poly1305",
        }
    }

    /// Get the key size in bytes required for this algorithm
    #[must_use]
    pub fn key_size(&self) -> usize {
        match self {
            Self::Aes128Gcm => 16,
            Self::Aes256Gcm | Self::ChaCha20Poly1305 => 32,
        }
    }

    /// Get the nonce size in bytes required for this algorithm
    #[must_use]
    pub fn nonce_size(&self) -> usize {
        12
    }

    /// Get the authentication tag size in bytes
    #[must_use]
    pub fn tag_size(&self) -> usize {
        16
    }
}

impl fmt::Display for CipherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CipherAlgorithm {
    type Err = crate::CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aes" | "aes256" | "aes256gcm" | "aes-256-gcm" => Ok(Self::Aes256Gcm),
            "aes128" | "aes128gcm" | "aes-128-gcm" => Ok(Self::Aes128Gcm),
            "chacha" | "chacha20" | "chacha20poly1305" | "chacha20-poly1305" => {
                Ok(Self::ChaCha20Poly1305)
            }
            _ => Err(crate::CipherError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}
