//! Capability interface a sensor driver reports into

use biolock_cipher::AuthToken;

/// Receiver of raw sensor events.
///
/// Implementations must tolerate events arriving concurrently with a
/// caller-issued stop.
pub trait SensorCallback: Send + Sync {
    /// A live scan did not match
    fn on_failed_attempt(&self);

    /// A scan was unusable but recoverable (partial, dirty sensor, ...)
    fn on_help(&self, code: i32, message: &str);

    /// Fatal error, lockout, or the echo of a cancellation
    fn on_error(&self, code: i32, message: &str);

    /// A live scan matched; `token` authorizes the pending operation
    fn on_succeeded(&self, token: AuthToken);
}
