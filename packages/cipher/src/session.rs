//! Cipher sessions and the tokens that authorize them

use crate::cipher::{self, CipherAlgorithm, SealedPayload};
use crate::{CipherError, Result, SessionLedger};
use biolock_common::LoggingTransformer;
use biolock_key::{KeyMaterial, SecureKeyContainer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Identifies one cipher operation; handed to the sensor as the cipher token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(Uuid);

impl OperationId {
    /// Fresh random operation id
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Proof of a live biometric match for one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthToken {
    operation_id: OperationId,
    authenticated_at: Instant,
}

impl AuthToken {
    /// Token for a match that happened now
    #[must_use]
    pub fn new(operation_id: OperationId) -> Self {
        Self {
            operation_id,
            authenticated_at: Instant::now(),
        }
    }

    /// Operation the match authorizes
    #[must_use]
    pub fn operation_id(&self) -> OperationId {
        self.operation_id
    }

    /// When the match happened
    #[must_use]
    pub fn authenticated_at(&self) -> Instant {
        self.authenticated_at
    }
}

/// Direction of the operation a session performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CipherMode {
    /// Seal plaintext
    Encrypt,
    /// Open a sealed payload
    Decrypt,
}

impl fmt::Display for CipherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encrypt => write!(f, "encrypt"),
            Self::Decrypt => write!(f, "decrypt"),
        }
    }
}

/// Lifecycle of a cipher session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Key not yet bound
    Uninitialized,
    /// Bound to its key, awaiting authorization
    Ready,
    /// A live biometric match authorized the operation
    Authorized,
    /// The key or session was invalidated; discard, do not retry
    Invalidated,
}

/// A cipher bound to a named key, good for exactly one operation.
///
/// `encrypt` and `decrypt` consume the session. The factory's ledger
/// additionally rejects sessions revoked because their key was re-created,
/// and every use re-checks that the bound key is still live in its container.
pub struct CipherSession {
    key_name: String,
    mode: CipherMode,
    state: SessionState,
    operation_id: OperationId,
    algorithm: CipherAlgorithm,
    requires_auth: bool,
    key: Option<KeyMaterial>,
    validity: Duration,
    authorized_at: Option<Instant>,
    ledger: Arc<SessionLedger>,
    keys: Arc<dyn SecureKeyContainer>,
    key_generation: u64,
}

impl CipherSession {
    pub(crate) fn uninitialized(
        key_name: &str,
        mode: CipherMode,
        algorithm: CipherAlgorithm,
        validity: Duration,
        ledger: Arc<SessionLedger>,
        keys: Arc<dyn SecureKeyContainer>,
    ) -> Self {
        Self {
            key_name: key_name.to_string(),
            mode,
            state: SessionState::Uninitialized,
            operation_id: OperationId::new(),
            algorithm,
            requires_auth: true,
            key: None,
            validity,
            authorized_at: None,
            ledger,
            keys,
            key_generation: 0,
        }
    }

    /// Bind key material and move to `Ready`
    pub(crate) fn bind(&mut self, key: KeyMaterial, requires_auth: bool, key_generation: u64) {
        self.ledger
            .register(self.operation_id, &self.key_name, key_generation);
        self.key = Some(key);
        self.key_generation = key_generation;
        self.requires_auth = requires_auth;
        self.state = SessionState::Ready;
    }

    /// Name of the bound key
    #[must_use]
    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    /// Operation direction
    #[must_use]
    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    /// Operation id passed to the sensor as the cipher token
    #[must_use]
    pub fn operation_id(&self) -> OperationId {
        self.operation_id
    }

    /// Algorithm of this session
    #[must_use]
    pub fn algorithm(&self) -> CipherAlgorithm {
        self.algorithm
    }

    /// Whether a live match is needed before use
    #[must_use]
    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }

    /// Current state.
    ///
    /// Reports `Invalidated` once the session was revoked or its key was
    /// invalidated, deleted or replaced in the container.
    #[must_use]
    pub fn state(&self) -> SessionState {
        match self.state {
            SessionState::Ready | SessionState::Authorized
                if !self.ledger.is_live(self.operation_id) || !self.key_alive() =>
            {
                SessionState::Invalidated
            }
            state => state,
        }
    }

    /// Apply a biometric match to this session
    ///
    /// # Errors
    ///
    /// Returns `CipherError::TokenMismatch` if the token authorizes another
    /// operation, or `CipherError::SessionStale` if the session was revoked
    /// or its key is no longer usable.
    pub fn authorize(&mut self, token: &AuthToken) -> Result<()> {
        if token.operation_id() != self.operation_id {
            return Err(CipherError::TokenMismatch);
        }
        match self.state() {
            SessionState::Ready | SessionState::Authorized => {
                self.state = SessionState::Authorized;
                self.authorized_at = Some(token.authenticated_at());
                Ok(())
            }
            SessionState::Invalidated => {
                self.state = SessionState::Invalidated;
                Err(CipherError::SessionStale(
                    "session revoked or key invalidated".to_string(),
                ))
            }
            SessionState::Uninitialized => Err(CipherError::NotAuthorized),
        }
    }

    /// Encrypt `plaintext`; consumes the session
    ///
    /// # Errors
    ///
    /// Authorization errors (`NotAuthorized`, `SessionStale`, `WrongMode`)
    /// if the session may not be used, `CryptoOperation` if the primitive
    /// fails. The key stays valid either way.
    pub fn encrypt(self, plaintext: &[u8]) -> Result<SealedPayload> {
        let key = self.claim(CipherMode::Encrypt)?;
        cipher::seal(self.algorithm, key.expose(), plaintext)
            .inspect_err(|e| LoggingTransformer::log_crypto_error("encrypt", e))
    }

    /// Decrypt `payload`; consumes the session
    ///
    /// # Errors
    ///
    /// As for [`encrypt`](Self::encrypt); a tampered payload or wrong key
    /// yields `CryptoOperation`.
    pub fn decrypt(self, payload: &SealedPayload) -> Result<Vec<u8>> {
        let key = self.claim(CipherMode::Decrypt)?;
        if payload.algorithm() != self.algorithm {
            return Err(CipherError::CryptoOperation(format!(
                "payload sealed with {}, session uses {}",
                payload.algorithm(),
                self.algorithm
            )));
        }
        cipher::open(key.expose(), payload)
            .inspect_err(|e| LoggingTransformer::log_crypto_error("decrypt", e))
    }

    fn claim(&self, mode: CipherMode) -> Result<&KeyMaterial> {
        if self.mode != mode {
            return Err(CipherError::WrongMode {
                expected: mode,
                actual: self.mode,
            });
        }
        let key = self.key.as_ref().ok_or(CipherError::NotAuthorized)?;
        if self.requires_auth {
            let authorized_at = match (self.state, self.authorized_at) {
                (SessionState::Authorized, Some(at)) => at,
                _ => return Err(CipherError::NotAuthorized),
            };
            if authorized_at.elapsed() > self.validity {
                self.ledger.release(self.operation_id);
                return Err(CipherError::SessionStale(format!(
                    "authorization older than {:?}",
                    self.validity
                )));
            }
        }
        if !self.key_alive() {
            self.ledger.release(self.operation_id);
            return Err(CipherError::SessionStale(
                "key invalidated or replaced".to_string(),
            ));
        }
        self.ledger.consume(self.operation_id)?;
        Ok(key)
    }

    fn key_alive(&self) -> bool {
        match self.keys.open() {
            Ok(handle) => handle.is_usable(&self.key_name, self.key_generation),
            Err(e) => {
                log::warn!("Key liveness check failed: {e}");
                false
            }
        }
    }
}

impl Drop for CipherSession {
    fn drop(&mut self) {
        self.ledger.release(self.operation_id);
    }
}

impl fmt::Debug for CipherSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherSession")
            .field("key_name", &self.key_name)
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("operation_id", &self.operation_id)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
