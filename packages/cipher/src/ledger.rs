//! Registry of live cipher sessions
//!
//! Every session the factory opens is registered by operation id. Using a
//! session removes its entry, so a second use (or use after the key was
//! re-created) finds nothing and is rejected.

use crate::session::OperationId;
use crate::{CipherError, Result};
use dashmap::DashMap;

#[derive(Debug, Clone)]
struct LedgerEntry {
    key_name: String,
    key_generation: u64,
}

/// Live operation ids, shared between the factory and its sessions
#[derive(Debug, Default)]
pub struct SessionLedger {
    live: DashMap<OperationId, LedgerEntry>,
}

impl SessionLedger {
    /// Create an empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&self, operation: OperationId, key_name: &str, key_generation: u64) {
        self.live.insert(
            operation,
            LedgerEntry {
                key_name: key_name.to_string(),
                key_generation,
            },
        );
    }

    /// Whether `operation` may still be used
    #[must_use]
    pub fn is_live(&self, operation: OperationId) -> bool {
        self.live.contains_key(&operation)
    }

    /// Claim `operation` for its one cryptographic operation
    pub(crate) fn consume(&self, operation: OperationId) -> Result<()> {
        self.live
            .remove(&operation)
            .map(|_| ())
            .ok_or_else(|| CipherError::SessionStale(format!("operation {operation} is no longer live")))
    }

    pub(crate) fn release(&self, operation: OperationId) {
        self.live.remove(&operation);
    }

    /// Revoke every live session on `key_name`; returns how many were revoked
    pub fn revoke_key(&self, key_name: &str) -> usize {
        let before = self.live.len();
        self.live.retain(|_, entry| entry.key_name != key_name);
        before - self.live.len()
    }

    /// Revoke sessions on `key_name` opened before `generation`
    pub fn revoke_older_than(&self, key_name: &str, generation: u64) -> usize {
        let before = self.live.len();
        self.live
            .retain(|_, entry| entry.key_name != key_name || entry.key_generation >= generation);
        before - self.live.len()
    }

    /// Number of live sessions
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no session is live
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
