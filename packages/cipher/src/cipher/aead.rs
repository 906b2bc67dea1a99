//! AEAD sealing and opening

use super::{CipherAlgorithm, SealedPayload};
use crate::{CipherError, Result};
use aes_gcm::{
    aead::{Aead, KeyInit, Nonce},
    Aes128Gcm, Aes256Gcm,
};
use chacha20poly1305::ChaCha20Poly1305;

/// Encrypt `plaintext` under `key` with a fresh random nonce
pub(crate) fn seal(algorithm: CipherAlgorithm, key: &[u8], plaintext: &[u8]) -> Result<SealedPayload> {
    use rand::RngCore;

    let mut nonce = vec![0u8; algorithm.nonce_size()];
    rand::rng().fill_bytes(&mut nonce);

    let ciphertext = match algorithm {
        CipherAlgorithm::Aes256Gcm => encrypt_with::<Aes256Gcm>(algorithm, key, &nonce, plaintext),
        CipherAlgorithm::Aes128Gcm => encrypt_with::<Aes128Gcm>(algorithm, key, &nonce, plaintext),
        CipherAlgorithm::ChaCha20Poly1305 => {
            encrypt_with::<ChaCha20Poly1305>(algorithm, key, &nonce, plaintext)
        }
    }?;

    Ok(SealedPayload::new(algorithm, nonce, ciphertext))
}

/// Decrypt and authenticate `payload` under `key`
pub(crate) fn open(key: &[u8], payload: &SealedPayload) -> Result<Vec<u8>> {
    let algorithm = payload.algorithm();
    if payload.nonce().len() != algorithm.nonce_size() {
        return Err(CipherError::InvalidNonceLength {
            expected: algorithm.nonce_size(),
            actual: payload.nonce().len(),
        });
    }

    match algorithm {
        CipherAlgorithm::Aes256Gcm => decrypt_with::<Aes256Gcm>(algorithm, key, payload),
        CipherAlgorithm::Aes128Gcm => decrypt_with::<Aes128Gcm>(algorithm, key, payload),
        CipherAlgorithm::ChaCha20Poly1305 => decrypt_with::<ChaCha20Poly1305>(algorithm, key, payload),
    }
}

fn new_cipher<A: KeyInit>(algorithm: CipherAlgorithm, key: &[u8]) -> Result<A> {
    A::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength {
        expected: algorithm.key_size(),
        actual: key.len(),
    })
}

fn encrypt_with<A: Aead + KeyInit>(
    algorithm: CipherAlgorithm,
    key: &[u8],
    nonce: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    let cipher = new_cipher::<A>(algorithm, key)?;
    cipher
        .encrypt(Nonce::<A>::from_slice(nonce), plaintext)
        .map_err(|e| CipherError::CryptoOperation(format!("{algorithm} encryption failed: {e}")))
}

fn decrypt_with<A: Aead + KeyInit>(
    algorithm: CipherAlgorithm,
    key: &[u8],
    payload: &SealedPayload,
) -> Result<Vec<u8>> {
    let cipher = new_cipher::<A>(algorithm, key)?;
    cipher
        .decrypt(Nonce::<A>::from_slice(payload.nonce()), payload.ciphertext())
        .map_err(|_| {
            CipherError::CryptoOperation(format!("{algorithm} decryption failed: authentication tag mismatch"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_then_open() {
        let key = [7u8; 32];
        let payload = seal(CipherAlgorithm::Aes256Gcm, &key, b"Very secret message").unwrap();

        assert_eq!(payload.nonce().len(), 12);
        assert_eq!(payload.ciphertext().len(), b"Very secret message".len() + 16);
        assert_eq!(open(&key, &payload).unwrap(), b"Very secret message");
    }

    #[test]
    fn wrong_key_is_operation_failure() {
        let payload = seal(CipherAlgorithm::ChaCha20Poly1305, &[1u8; 32], b"data").unwrap();
        let err = open(&[2u8; 32], &payload).unwrap_err();
        assert!(err.is_operation_failure());
    }

    #[test]
    fn key_length_mismatch() {
        let err = seal(CipherAlgorithm::Aes256Gcm, &[0u8; 16], b"data").unwrap_err();
        assert!(matches!(
            err,
            CipherError::InvalidKeyLength { expected: 32, actual: 16 }
        ));
    }
}
