//! Output of a sealing operation with encoding helpers

use super::CipherAlgorithm;
use crate::{CipherError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Nonce and ciphertext produced by an authorized encryption
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedPayload {
    algorithm: CipherAlgorithm,
    nonce: Vec<u8>,
    ciphertext: Vec<u8>,
}

impl SealedPayload {
    /// Assemble a payload from its parts
    #[must_use]
    pub fn new(algorithm: CipherAlgorithm, nonce: Vec<u8>, ciphertext: Vec<u8>) -> Self {
        Self {
            algorithm,
            nonce,
            ciphertext,
        }
    }

    /// Algorithm the payload was sealed with
    #[must_use]
    pub fn algorithm(&self) -> CipherAlgorithm {
        self.algorithm
    }

    /// Nonce bytes
    #[must_use]
    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    /// Ciphertext including the authentication tag
    #[must_use]
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// `nonce || ciphertext`
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.nonce.len() + self.ciphertext.len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Split `nonce || ciphertext` produced by [`to_bytes`](Self::to_bytes)
    ///
    /// # Errors
    ///
    /// Returns `CipherError::InvalidEncryptedData` if the input is shorter
    /// than a nonce plus a tag.
    pub fn from_bytes(algorithm: CipherAlgorithm, bytes: &[u8]) -> Result<Self> {
        let nonce_len = algorithm.nonce_size();
        if bytes.len() < nonce_len + algorithm.tag_size() {
            return Err(CipherError::InvalidEncryptedData(format!(
                "expected at least {} bytes, got {}",
                nonce_len + algorithm.tag_size(),
                bytes.len()
            )));
        }
        let (nonce, ciphertext) = bytes.split_at(nonce_len);
        Ok(Self::new(algorithm, nonce.to_vec(), ciphertext.to_vec()))
    }

    /// Base64 of `nonce || ciphertext`
    #[must_use]
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.to_bytes())
    }

    /// Parse the output of [`to_base64`](Self::to_base64)
    ///
    /// # Errors
    ///
    /// Returns `CipherError::InvalidEncryptedData` on malformed input.
    pub fn from_base64(algorithm: CipherAlgorithm, encoded: &str) -> Result<Self> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(encoded)?;
        Self::from_bytes(algorithm, &bytes)
    }

    /// Hex of `nonce || ciphertext`
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Parse the output of [`to_hex`](Self::to_hex)
    ///
    /// # Errors
    ///
    /// Returns `CipherError::InvalidEncryptedData` on malformed input.
    pub fn from_hex(algorithm: CipherAlgorithm, encoded: &str) -> Result<Self> {
        let bytes = hex::decode(encoded)?;
        Self::from_bytes(algorithm, &bytes)
    }
}
