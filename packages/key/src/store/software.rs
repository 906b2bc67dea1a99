//! In-process secure key container
//!
//! Holds key material in memory behind a mutex and simulates the platform
//! events that invalidate biometric-bound keys.

use crate::{
    ContainerHandle, KeyError, KeyMaterial, KeyPolicy, KeyRecord, LoadedKey, Result,
    SecureKeyContainer,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

struct StoredKey {
    record: KeyRecord,
    material: KeyMaterial,
    invalidated: bool,
}

/// Software implementation of [`SecureKeyContainer`]
pub struct SoftwareKeyContainer {
    entries: Mutex<HashMap<String, StoredKey>>,
    available: AtomicBool,
    generation: AtomicU64,
}

impl Default for SoftwareKeyContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareKeyContainer {
    /// Create an empty, available container
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
            generation: AtomicU64::new(0),
        }
    }

    /// Make subsequent `open` calls fail (or succeed again)
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// The enrolled biometric set changed.
    ///
    /// Invalidates every key created with `invalidated_by_new_enrollment`.
    /// Returns the number of keys newly invalidated.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::StoreUnavailable` if the container lock is poisoned.
    pub fn simulate_enrollment_change(&self) -> Result<usize> {
        self.invalidate_where("enrollment_change", |record| {
            record.invalidated_by_new_enrollment
        })
    }

    /// The secure lock screen was disabled or reset.
    ///
    /// Invalidates every key that requires live authentication.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::StoreUnavailable` if the container lock is poisoned.
    pub fn simulate_lock_screen_reset(&self) -> Result<usize> {
        self.invalidate_where("lock_screen_reset", |record| record.requires_live_auth)
    }

    fn invalidate_where(&self, event: &str, predicate: impl Fn(&KeyRecord) -> bool) -> Result<usize> {
        let mut entries = self.lock()?;
        let mut count = 0;
        for stored in entries.values_mut() {
            if !stored.invalidated && predicate(&stored.record) {
                stored.invalidated = true;
                count += 1;
            }
        }
        log::warn!("Platform event {event} invalidated {count} key(s)");
        Ok(count)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, StoredKey>>> {
        self.entries
            .lock()
            .map_err(|_| KeyError::unavailable("container lock poisoned"))
    }
}

impl SecureKeyContainer for SoftwareKeyContainer {
    fn open(&self) -> Result<Box<dyn ContainerHandle + '_>> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(KeyError::unavailable("secure container offline"));
        }
        Ok(Box::new(SoftwareContainerHandle {
            entries: self.lock()?,
            generation: &self.generation,
        }))
    }
}

/// Open handle on a [`SoftwareKeyContainer`]; holds the container lock
pub struct SoftwareContainerHandle<'a> {
    entries: MutexGuard<'a, HashMap<String, StoredKey>>,
    generation: &'a AtomicU64,
}

impl ContainerHandle for SoftwareContainerHandle<'_> {
    fn put_key(&mut self, name: &str, policy: &KeyPolicy) -> Result<KeyRecord> {
        if !matches!(policy.size_bits, 128 | 256) {
            return Err(KeyError::KeyGeneration(format!(
                "unsupported key size: {} bits",
                policy.size_bits
            )));
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let record = KeyRecord::new(name, policy, generation);
        let stored = StoredKey {
            record: record.clone(),
            material: KeyMaterial::generate(policy.size_bytes()),
            invalidated: false,
        };
        if self.entries.insert(name.to_string(), stored).is_some() {
            log::debug!("Replaced existing key (generation {generation})");
        }
        Ok(record)
    }

    fn get_key(&self, name: &str) -> Result<LoadedKey> {
        let stored = self.entries.get(name).ok_or_else(|| KeyError::KeyNotFound {
            name: name.to_string(),
        })?;
        if stored.invalidated {
            return Err(KeyError::KeyInvalidated {
                name: name.to_string(),
            });
        }
        Ok(LoadedKey {
            record: stored.record.clone(),
            material: stored.material.clone(),
        })
    }

    fn record(&self, name: &str) -> Option<KeyRecord> {
        self.entries.get(name).map(|stored| stored.record.clone())
    }

    fn is_usable(&self, name: &str, generation: u64) -> bool {
        self.entries
            .get(name)
            .is_some_and(|stored| !stored.invalidated && stored.record.generation == generation)
    }

    fn delete_key(&mut self, name: &str) -> Result<bool> {
        Ok(self.entries.remove(name).is_some())
    }
}
