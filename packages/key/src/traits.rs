//! Contract over a secure, hardware-backed key container

use crate::{KeyPolicy, KeyRecord, LoadedKey, Result};

/// A secure key container.
///
/// `open` grants exclusive access for as long as the returned handle lives.
/// Callers hold the handle only for the synchronous part of a key
/// operation, never across a sensor listen.
pub trait SecureKeyContainer: Send + Sync {
    /// Open the container
    ///
    /// # Errors
    ///
    /// Returns `KeyError::StoreUnavailable` if the container cannot be opened.
    fn open(&self) -> Result<Box<dyn ContainerHandle + '_>>;
}

/// Exclusive access to an opened container
pub trait ContainerHandle {
    /// Create a key under `name`, replacing any key of the same name
    ///
    /// # Errors
    ///
    /// Returns `KeyError::KeyGeneration` if the policy cannot be honored.
    fn put_key(&mut self, name: &str, policy: &KeyPolicy) -> Result<KeyRecord>;

    /// Load the key material for `name`
    ///
    /// # Errors
    ///
    /// Returns `KeyError::KeyInvalidated` if the platform invalidated the key
    /// and `KeyError::KeyNotFound` if no key has that name.
    fn get_key(&self, name: &str) -> Result<LoadedKey>;

    /// Record for `name`, including invalidated keys
    fn record(&self, name: &str) -> Option<KeyRecord>;

    /// Whether `name` still holds the usable key of `generation`.
    ///
    /// False once the key was invalidated, deleted or replaced.
    fn is_usable(&self, name: &str, generation: u64) -> bool {
        self.get_key(name)
            .is_ok_and(|loaded| loaded.record.generation == generation)
    }

    /// Remove the key; returns whether a key was present
    ///
    /// # Errors
    ///
    /// Returns an error if the container rejects the removal.
    fn delete_key(&mut self, name: &str) -> Result<bool>;
}
