//! Key records and creation policy

use crate::material::KeyMaterial;
use serde::{Deserialize, Serialize};

/// Default key size for biometric-bound keys
pub const DEFAULT_KEY_BITS: u32 = 256;

/// How a key is created and when the platform may invalidate it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPolicy {
    /// Key is only usable after a live biometric match
    pub requires_live_auth: bool,
    /// Key is destroyed when the enrolled biometric set changes
    pub invalidated_by_new_enrollment: bool,
    /// Key size in bits (128 or 256)
    pub size_bits: u32,
}

impl KeyPolicy {
    /// 256-bit key that requires a live biometric match before each use
    #[must_use]
    pub fn biometric_bound(invalidated_by_new_enrollment: bool) -> Self {
        Self {
            requires_live_auth: true,
            invalidated_by_new_enrollment,
            size_bits: DEFAULT_KEY_BITS,
        }
    }

    /// Key size in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        (self.size_bits / 8) as usize
    }
}

impl Default for KeyPolicy {
    fn default() -> Self {
        Self::biometric_bound(true)
    }
}

/// Immutable description of a key held by the container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    /// Unique name within the container
    pub name: String,
    /// Key is only usable after a live biometric match
    pub requires_live_auth: bool,
    /// Key is destroyed when the enrolled biometric set changes
    pub invalidated_by_new_enrollment: bool,
    /// Bumped every time a key of this name is (re)created
    pub generation: u64,
}

impl KeyRecord {
    /// Build a record for `name` under `policy`
    #[must_use]
    pub fn new(name: impl Into<String>, policy: &KeyPolicy, generation: u64) -> Self {
        Self {
            name: name.into(),
            requires_live_auth: policy.requires_live_auth,
            invalidated_by_new_enrollment: policy.invalidated_by_new_enrollment,
            generation,
        }
    }
}

/// Key material together with its record, as returned by `get_key`
#[derive(Debug, Clone)]
pub struct LoadedKey {
    /// Record of the key
    pub record: KeyRecord,
    /// Secret bytes
    pub material: KeyMaterial,
}
