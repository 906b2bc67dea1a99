//! Authorization coordinator

use crate::{AuthCallbacks, AuthConfig, AuthError, AuthOutcome, FallbackReason, Result};
use biolock_cipher::{CipherMode, CipherSessionFactory, InitError, SessionState};
use biolock_common::{LoggingTransformer, NotResult};
use biolock_key::{KeyLifecycleManager, KeyRecord, SecureKeyContainer};
use biolock_sensor::{
    BiometricSensor, BiometricSensorSession, DeviceCapabilities, LockScreen, SensorError,
    SensorOutcome, SensorOutcomeResult, SensorSession, StatusUpdate, UnavailableReason,
};
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Drives one authorization attempt from cipher session to outcome
pub struct AuthorizationCoordinator<C, S, L> {
    keys: KeyLifecycleManager<C>,
    factory: CipherSessionFactory<C>,
    sensor: BiometricSensorSession<S>,
    lock_screen: Arc<L>,
    config: AuthConfig,
}

impl<C, S, L> AuthorizationCoordinator<C, S, L>
where
    C: SecureKeyContainer + 'static,
    S: BiometricSensor + 'static,
    L: LockScreen,
{
    /// Coordinator with default configuration
    pub fn new(container: Arc<C>, sensor: Arc<S>, lock_screen: Arc<L>) -> Self {
        Self::with_config(container, sensor, lock_screen, AuthConfig::default())
    }

    /// Coordinator with explicit configuration
    pub fn with_config(
        container: Arc<C>,
        sensor: Arc<S>,
        lock_screen: Arc<L>,
        config: AuthConfig,
    ) -> Self {
        Self {
            keys: KeyLifecycleManager::new(Arc::clone(&container)),
            factory: CipherSessionFactory::with_config(container, config.cipher.clone()),
            sensor: BiometricSensorSession::with_config(sensor, config.sensor.clone()),
            lock_screen,
            config,
        }
    }

    /// Key lifecycle manager
    pub fn keys(&self) -> &KeyLifecycleManager<C> {
        &self.keys
    }

    /// Cipher session factory
    pub fn factory(&self) -> &CipherSessionFactory<C> {
        &self.factory
    }

    /// Sensor session starter
    pub fn sensor(&self) -> &BiometricSensorSession<S> {
        &self.sensor
    }

    /// Active configuration
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Receive status messages for display
    pub fn subscribe_status(&self) -> broadcast::Receiver<StatusUpdate> {
        self.sensor.subscribe()
    }

    /// Current device capabilities
    pub fn capabilities(&self) -> DeviceCapabilities {
        DeviceCapabilities::detect(self.sensor.sensor().as_ref(), self.lock_screen.as_ref())
    }

    /// Full availability check: hardware, enrollment, secure lock screen
    ///
    /// # Errors
    ///
    /// Returns the first missing requirement.
    pub fn availability(&self) -> std::result::Result<(), UnavailableReason> {
        self.capabilities().check()
    }

    /// Create (or replace) a biometric-bound key.
    ///
    /// Sessions already open for `name` become stale.
    ///
    /// # Errors
    ///
    /// `AuthError::Unavailable` if the device cannot do biometric
    /// authentication; `AuthError::Key` if the container fails.
    pub fn enroll_key(&self, name: &str, invalidate_on_new_enrollment: bool) -> Result<KeyRecord> {
        self.availability().map_err(AuthError::Unavailable)?;
        let record = self.keys.create_key(name, invalidate_on_new_enrollment)?;
        let revoked = self.factory.revoke_key(name);
        if revoked > 0 {
            info!("Revoked {revoked} open session(s) after re-creating a key");
        }
        Ok(record)
    }

    /// Create the configured default key with the configured policy
    ///
    /// # Errors
    ///
    /// As for [`enroll_key`](Self::enroll_key).
    pub fn enroll_default_key(&self) -> Result<KeyRecord> {
        self.enroll_key(
            &self.config.default_key_name,
            self.config.invalidate_on_new_enrollment,
        )
    }

    /// Begin an encryption authorization for `key_name`
    ///
    /// # Errors
    ///
    /// Only unexpected defects are errors: a fatal cipher construction
    /// failure or a sensor driver that refuses to listen. Unavailability and
    /// key invalidation resolve the pending handle to `FallbackRequested`.
    pub fn authorize(&self, key_name: &str) -> Result<PendingAuthorization> {
        self.authorize_with_mode(key_name, CipherMode::Encrypt)
    }

    /// Begin an authorization for an operation in `mode`
    ///
    /// # Errors
    ///
    /// As for [`authorize`](Self::authorize).
    pub fn authorize_with_mode(
        &self,
        key_name: &str,
        mode: CipherMode,
    ) -> Result<PendingAuthorization> {
        if let Err(reason) = self.availability() {
            return Ok(PendingAuthorization::fallback(
                key_name,
                FallbackReason::Unavailable(reason),
            ));
        }

        let cipher_session = match self.factory.begin_session_with_mode(key_name, mode) {
            Ok(session) => session,
            Err(InitError::KeyInvalidated { .. }) => {
                return Ok(PendingAuthorization::fallback(
                    key_name,
                    FallbackReason::KeyInvalidated,
                ));
            }
            Err(e) => return Err(e.into()),
        };

        match self.sensor.start(cipher_session) {
            Ok(session) => {
                LoggingTransformer::log_auth_event("listen", key_name, true);
                Ok(PendingAuthorization::listening(key_name, session))
            }
            Err(SensorError::Unavailable(reason)) => Ok(PendingAuthorization::fallback(
                key_name,
                FallbackReason::Unavailable(reason),
            )),
            Err(e) => Err(e.into()),
        }
    }
}

/// Handle to an in-flight authorization.
///
/// Resolves exactly once. Dropping it before the outcome is read stops the
/// sensor.
#[must_use = "dropping a pending authorization cancels it"]
pub struct PendingAuthorization {
    key_name: String,
    session: Option<SensorSession>,
    sensor_outcome: Option<SensorOutcomeResult>,
    resolved: Option<AuthOutcome>,
}

impl PendingAuthorization {
    fn fallback(key_name: &str, reason: FallbackReason) -> Self {
        Self {
            key_name: key_name.to_string(),
            session: None,
            sensor_outcome: None,
            resolved: Some(AuthOutcome::FallbackRequested(reason)),
        }
    }

    fn listening(key_name: &str, session: SensorSession) -> Self {
        Self {
            key_name: key_name.to_string(),
            sensor_outcome: Some(session.outcome()),
            session: Some(session),
            resolved: None,
        }
    }

    /// Sensor session behind this attempt, if listening started
    pub fn sensor_session(&self) -> Option<&SensorSession> {
        self.session.as_ref()
    }

    /// Whether the outcome was decided without listening
    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    /// Abandon the attempt; the outcome becomes `Cancelled`
    pub fn cancel(&self) {
        if let Some(session) = &self.session {
            session.stop();
        }
    }

    /// Cloneable handle that can cancel from elsewhere
    pub fn canceller(&self) -> AuthorizationCanceller {
        AuthorizationCanceller {
            session: self.session.clone(),
        }
    }

    /// Wait for the terminal outcome
    pub async fn outcome(mut self) -> AuthOutcome {
        let outcome = match self.resolved.take() {
            Some(outcome) => outcome,
            None => {
                let sensor_outcome = match self.sensor_outcome.take() {
                    Some(pending) => pending.await,
                    None => SensorOutcome::Stopped,
                };
                self.session = None;
                match sensor_outcome {
                    SensorOutcome::Succeeded(cipher_session)
                        if cipher_session.state() == SessionState::Invalidated =>
                    {
                        warn!("Biometric match arrived after its key was invalidated");
                        AuthOutcome::FallbackRequested(FallbackReason::KeyInvalidated)
                    }
                    SensorOutcome::Succeeded(cipher_session) => {
                        AuthOutcome::Authenticated { cipher_session }
                    }
                    SensorOutcome::Failed { message } => {
                        AuthOutcome::FallbackRequested(FallbackReason::SensorError { message })
                    }
                    SensorOutcome::Stopped => AuthOutcome::Cancelled,
                }
            }
        };

        match &outcome {
            AuthOutcome::Authenticated { .. } => {
                LoggingTransformer::log_auth_event("authenticated", &self.key_name, true);
            }
            AuthOutcome::FallbackRequested(reason) => {
                warn!("Biometric authorization falling back: {reason}");
                LoggingTransformer::log_auth_event("fallback", &self.key_name, false);
            }
            AuthOutcome::Cancelled => {
                info!("Biometric authorization cancelled");
            }
        }
        outcome
    }

    /// Map the outcome through `handler`
    pub async fn on_outcome<F, T>(self, handler: F) -> T
    where
        F: FnOnce(AuthOutcome) -> T,
        T: NotResult,
    {
        handler(self.outcome().await)
    }

    /// Wait for the outcome and invoke exactly one callback
    pub async fn deliver<A>(self, callbacks: &A)
    where
        A: AuthCallbacks + ?Sized,
    {
        match self.outcome().await {
            AuthOutcome::Authenticated { cipher_session } => {
                callbacks.on_authenticated(cipher_session);
            }
            AuthOutcome::FallbackRequested(reason) => callbacks.on_fallback_requested(reason),
            AuthOutcome::Cancelled => callbacks.on_cancelled(),
        }
    }
}

impl Drop for PendingAuthorization {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.stop();
        }
    }
}

impl std::fmt::Debug for PendingAuthorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingAuthorization")
            .field("session", &self.session)
            .field("resolved", &self.resolved)
            .finish_non_exhaustive()
    }
}

/// Cancels an authorization from another task
#[derive(Clone, Debug)]
pub struct AuthorizationCanceller {
    session: Option<SensorSession>,
}

impl AuthorizationCanceller {
    /// Stop the sensor; the pending outcome becomes `Cancelled`
    pub fn cancel(&self) {
        if let Some(session) = &self.session {
            session.stop();
        }
    }
}
