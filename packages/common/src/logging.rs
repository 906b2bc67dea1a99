//! Structured logging bootstrap
//!
//! Provides env_logger-based logging with redaction of key names so
//! authorization traces can be shared without leaking key aliases.

use log::{error, info, warn};
use sha2::{Digest, Sha256};
use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Logging entry points for the authorization core
pub struct LoggingTransformer;

impl LoggingTransformer {
    /// Initialize logging (call once at application startup)
    ///
    /// Levels come from `RUST_LOG`, for example
    /// `RUST_LOG=biolock_sensor=debug,biolock=info`.
    pub fn init() {
        INIT_LOGGER.call_once(|| {
            env_logger::Builder::from_default_env()
                .format_timestamp_micros()
                .init();

            info!("Structured logging initialized");
        });
    }

    /// Initialize logging for test environments
    ///
    /// Safe to call from every test; repeated initialization is ignored.
    pub fn init_test() {
        let _ = env_logger::Builder::from_default_env()
            .is_test(true)
            .try_init();
    }

    /// Log a key lifecycle operation (create, delete, invalidate)
    pub fn log_key_operation(operation: &str, key_name: &str, success: bool) {
        let key_hash = Self::secure_hash_key(key_name);
        if success {
            info!("Key operation succeeded: {operation} (key_hash: {key_hash})");
        } else {
            warn!("Key operation failed: {operation} (key_hash: {key_hash})");
        }
    }

    /// Log an authorization event for a key
    pub fn log_auth_event(event: &str, key_name: &str, success: bool) {
        let key_hash = Self::secure_hash_key(key_name);
        if success {
            info!("Authorization succeeded: {event} (key_hash: {key_hash})");
        } else {
            warn!("Authorization did not complete: {event} (key_hash: {key_hash})");
        }
    }

    /// Log a cryptographic failure without exposing its payload
    pub fn log_crypto_error<E: std::error::Error>(operation: &str, error: &E) {
        error!("{}", Self::crypto_error_summary(operation, error));
    }

    /// Line logged by [`log_crypto_error`](Self::log_crypto_error)
    #[must_use]
    pub fn crypto_error_summary<E: std::error::Error>(operation: &str, error: &E) -> String {
        format!(
            "Cryptographic operation failed: {operation} (error_type: {}, reason: {error})",
            std::any::type_name::<E>()
        )
    }

    /// SHA-256 prefix of a key name, safe to put in logs
    #[must_use]
    pub fn secure_hash_key(key: &str) -> String {
        let hash = Sha256::digest(key.as_bytes());
        let hex_hash = format!("{hash:x}");
        format!("#{}", &hex_hash[..12])
    }
}
