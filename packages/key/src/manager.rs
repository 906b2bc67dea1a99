//! Key lifecycle: creation, lookup and removal of biometric-bound keys

use crate::{KeyError, KeyPolicy, KeyRecord, Result, SecureKeyContainer};
use biolock_common::LoggingTransformer;
use std::sync::Arc;

/// Creates biometric-bound keys and exposes them by name.
///
/// The manager does not check sensor availability itself; callers must
/// confirm hardware, enrollment and a secure lock screen before
/// [`create_key`](Self::create_key).
pub struct KeyLifecycleManager<C> {
    container: Arc<C>,
}

impl<C> Clone for KeyLifecycleManager<C> {
    fn clone(&self) -> Self {
        Self {
            container: Arc::clone(&self.container),
        }
    }
}

impl<C: SecureKeyContainer> KeyLifecycleManager<C> {
    /// Create a manager over `container`
    pub fn new(container: Arc<C>) -> Self {
        Self { container }
    }

    /// The underlying container
    pub fn container(&self) -> &Arc<C> {
        &self.container
    }

    /// Create (or replace) a 256-bit key that requires live authentication
    ///
    /// # Errors
    ///
    /// Returns `KeyError::StoreUnavailable` if the container cannot be opened.
    pub fn create_key(&self, name: &str, invalidate_on_new_enrollment: bool) -> Result<KeyRecord> {
        self.create_key_with_policy(name, &KeyPolicy::biometric_bound(invalidate_on_new_enrollment))
    }

    /// Create (or replace) a key under an explicit policy
    ///
    /// # Errors
    ///
    /// Returns `KeyError::InvalidKeyName` for an empty name,
    /// `KeyError::StoreUnavailable` if the container cannot be opened, or
    /// `KeyError::KeyGeneration` if the policy cannot be honored.
    pub fn create_key_with_policy(&self, name: &str, policy: &KeyPolicy) -> Result<KeyRecord> {
        if name.trim().is_empty() {
            return Err(KeyError::InvalidKeyName(name.to_string()));
        }

        let result = self
            .container
            .open()
            .and_then(|mut handle| handle.put_key(name, policy));
        LoggingTransformer::log_key_operation("create", name, result.is_ok());
        result
    }

    /// Whether a key of this name exists, invalidated or not
    pub fn has_key(&self, name: &str) -> bool {
        match self.container.open() {
            Ok(handle) => handle.record(name).is_some(),
            Err(e) => {
                log::warn!("Key lookup failed: {e}");
                false
            }
        }
    }

    /// Record for `name`, if any
    ///
    /// # Errors
    ///
    /// Returns `KeyError::StoreUnavailable` if the container cannot be opened.
    pub fn record(&self, name: &str) -> Result<Option<KeyRecord>> {
        Ok(self.container.open()?.record(name))
    }

    /// Remove a key; returns whether one was present
    ///
    /// # Errors
    ///
    /// Returns `KeyError::StoreUnavailable` if the container cannot be opened.
    pub fn delete_key(&self, name: &str) -> Result<bool> {
        let result = self
            .container
            .open()
            .and_then(|mut handle| handle.delete_key(name));
        LoggingTransformer::log_key_operation("delete", name, result.is_ok());
        result
    }
}
