//! Raw symmetric key material

use std::fmt;
use zeroize::Zeroizing;

/// Symmetric key bytes, wiped from memory on drop
#[derive(Clone)]
pub struct KeyMaterial(Zeroizing<Vec<u8>>);

impl KeyMaterial {
    /// Wrap raw key bytes
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Generate `size_bytes` of random key material
    #[must_use]
    pub fn generate(size_bytes: usize) -> Self {
        use rand::RngCore;

        let mut bytes = Zeroizing::new(vec![0u8; size_bytes]);
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Borrow the key bytes
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        &self.0
    }

    /// Key length in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the material is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyMaterial([REDACTED; {}])", self.0.len())
    }
}
