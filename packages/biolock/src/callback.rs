//! Caller-owned callback surface

use crate::FallbackReason;
use biolock_cipher::CipherSession;

/// Receives the outcome of an authorization attempt.
///
/// Exactly one method is invoked per attempt.
pub trait AuthCallbacks {
    /// Live match; `cipher_session` may perform one operation
    fn on_authenticated(&self, cipher_session: CipherSession);

    /// Switch to the fallback credential
    fn on_fallback_requested(&self, reason: FallbackReason);

    /// Attempt abandoned
    fn on_cancelled(&self) {}
}
