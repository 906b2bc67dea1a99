//! Opens cipher sessions for named keys

use crate::{CipherConfig, CipherMode, CipherSession, InitError, SessionLedger};
use biolock_key::{KeyError, SecureKeyContainer};
use std::sync::Arc;

/// Builds cipher sessions bound to keys held in a secure container.
///
/// The container is opened briefly while a session is being opened and
/// again whenever a session checks its key; nothing holds it across a
/// sensor listen.
pub struct CipherSessionFactory<C> {
    container: Arc<C>,
    ledger: Arc<SessionLedger>,
    config: CipherConfig,
}

impl<C> Clone for CipherSessionFactory<C> {
    fn clone(&self) -> Self {
        Self {
            container: Arc::clone(&self.container),
            ledger: Arc::clone(&self.ledger),
            config: self.config.clone(),
        }
    }
}

impl<C: SecureKeyContainer + 'static> CipherSessionFactory<C> {
    /// Factory with default configuration
    pub fn new(container: Arc<C>) -> Self {
        Self::with_config(container, CipherConfig::default())
    }

    /// Factory with explicit configuration
    pub fn with_config(container: Arc<C>, config: CipherConfig) -> Self {
        Self {
            container,
            ledger: Arc::new(SessionLedger::new()),
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &CipherConfig {
        &self.config
    }

    /// Ledger of live sessions
    pub fn ledger(&self) -> &Arc<SessionLedger> {
        &self.ledger
    }

    /// Open an encryption session awaiting authorization
    ///
    /// # Errors
    ///
    /// `InitError::KeyInvalidated` if the platform invalidated the key;
    /// `InitError::Fatal` for any other store or crypto failure.
    pub fn begin_session(&self, key_name: &str) -> Result<CipherSession, InitError> {
        self.begin_session_with_mode(key_name, CipherMode::Encrypt)
    }

    /// Open a session for `mode`
    ///
    /// # Errors
    ///
    /// As for [`begin_session`](Self::begin_session).
    pub fn begin_session_with_mode(
        &self,
        key_name: &str,
        mode: CipherMode,
    ) -> Result<CipherSession, InitError> {
        let algorithm = self.config.algorithm;
        let mut session = CipherSession::uninitialized(
            key_name,
            mode,
            algorithm,
            self.config.session_validity(),
            Arc::clone(&self.ledger),
            Arc::clone(&self.container) as Arc<dyn SecureKeyContainer>,
        );

        let loaded = self
            .container
            .open()
            .and_then(|handle| handle.get_key(key_name))
            .map_err(|e| match e {
                KeyError::KeyInvalidated { name } => {
                    log::warn!("Cipher init refused: key permanently invalidated");
                    InitError::KeyInvalidated { key_name: name }
                }
                other => {
                    log::error!("Failed to init cipher: {other}");
                    InitError::Fatal(other.to_string())
                }
            })?;

        if loaded.material.len() != algorithm.key_size() {
            let detail = format!(
                "{algorithm} needs a {}-byte key, stored key has {} bytes",
                algorithm.key_size(),
                loaded.material.len()
            );
            log::error!("Failed to init cipher: {detail}");
            return Err(InitError::Fatal(detail));
        }

        let revoked = self
            .ledger
            .revoke_older_than(key_name, loaded.record.generation);
        if revoked > 0 {
            log::debug!("Revoked {revoked} session(s) on a replaced key");
        }

        session.bind(
            loaded.material,
            loaded.record.requires_live_auth,
            loaded.record.generation,
        );
        log::debug!(
            "Cipher session {} ready ({algorithm}, {mode})",
            session.operation_id()
        );
        Ok(session)
    }

    /// Revoke every live session on `key_name`
    pub fn revoke_key(&self, key_name: &str) -> usize {
        self.ledger.revoke_key(key_name)
    }
}
