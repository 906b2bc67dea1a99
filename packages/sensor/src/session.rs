//! Sensor session lifecycle

use crate::outcome::{SensorOutcome, SensorOutcomeResult};
use crate::{
    BiometricSensor, Result, SensorCallback, SensorConfig, SensorError, SensorEvent,
    SensorEventStream, StatusChannel, StatusUpdate, UnavailableReason,
};
use biolock_cipher::{AuthToken, CipherError, CipherSession, OperationId};
use biolock_common::LoggingTransformer;
use futures::StreamExt;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, oneshot};
use tokio_util::sync::CancellationToken;

/// Lifecycle state of a sensor session.
///
/// Failed attempts and help messages are transient: the session returns to
/// `Listening` immediately, and the event is visible through
/// [`SensorSession::last_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorState {
    /// Not yet listening
    Idle,
    /// Waiting for a scan
    Listening,
    /// Live match accepted
    Succeeded,
    /// Fatal sensor error
    Error,
    /// Stopped by the caller
    Cancelled,
}

impl SensorState {
    /// Whether no further events are processed
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Error | Self::Cancelled)
    }
}

/// Kind of the most recent sensor event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorEventKind {
    /// Scan did not match
    FailedAttempt,
    /// Recoverable scan problem
    Help,
    /// Fatal error
    Error,
    /// Match
    Succeeded,
}

/// Starts sensor sessions against one sensor
pub struct BiometricSensorSession<S> {
    sensor: Arc<S>,
    status: Arc<StatusChannel>,
    config: SensorConfig,
}

impl<S> BiometricSensorSession<S>
where
    S: BiometricSensor + 'static,
{
    /// Sessions with default timings
    pub fn new(sensor: Arc<S>) -> Self {
        Self::with_config(sensor, SensorConfig::default())
    }

    /// Sessions with custom timings and texts
    pub fn with_config(sensor: Arc<S>, config: SensorConfig) -> Self {
        let status = Arc::new(StatusChannel::new(&config));
        Self {
            sensor,
            status,
            config,
        }
    }

    /// Underlying sensor
    pub fn sensor(&self) -> &Arc<S> {
        &self.sensor
    }

    /// Active configuration
    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Status channel shared by every session
    pub fn status(&self) -> &Arc<StatusChannel> {
        &self.status
    }

    /// Receive status messages
    pub fn subscribe(&self) -> broadcast::Receiver<StatusUpdate> {
        self.status.subscribe()
    }

    /// Hardware present and at least one biometric enrolled
    pub fn is_available(&self) -> bool {
        self.sensor.is_present() && self.sensor.has_enrollment()
    }

    /// Begin listening; the cipher session is authorized by a match.
    ///
    /// Every call uses a fresh cancellation token and starts with the
    /// self-cancelled flag cleared. Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// `SensorError::Unavailable` without hardware or enrollment,
    /// `SensorError::NoRuntime` outside a runtime, or the driver's error if
    /// it refuses to listen. The cipher session is dropped in every case.
    pub fn start(&self, cipher_session: CipherSession) -> Result<SensorSession> {
        if !self.sensor.is_present() {
            return Err(SensorError::Unavailable(UnavailableReason::NoHardware));
        }
        if !self.sensor.has_enrollment() {
            return Err(SensorError::Unavailable(UnavailableReason::NoEnrollment));
        }
        let runtime = Handle::try_current().map_err(|_| SensorError::NoRuntime)?;

        let operation_id = cipher_session.operation_id();
        let key_name = cipher_session.key_name().to_string();
        let listen = CancellationToken::new();
        let (outcome_tx, outcome_rx) = oneshot::channel();

        let session = SensorSession {
            shared: Arc::new(Shared {
                operation_id,
                key_name,
                started_at: Instant::now(),
                listen: listen.clone(),
                publication: CancellationToken::new(),
                status: Arc::clone(&self.status),
                config: self.config.clone(),
                runtime: runtime.clone(),
                inner: Mutex::new(Inner {
                    state: SensorState::Listening,
                    self_cancelled: false,
                    publication_pending: false,
                    last_event: None,
                    history: vec![SensorState::Listening],
                    cipher_session: Some(cipher_session),
                    outcome_tx: Some(outcome_tx),
                    outcome_rx: Some(outcome_rx),
                }),
            }),
        };

        let events = self.sensor.authenticate(operation_id, listen.clone())?;
        self.status.publish_hint();
        debug!("Sensor listening for operation {operation_id}");

        runtime.spawn(pump(session.clone(), events, listen));
        Ok(session)
    }
}

/// Forward driver events into the session until it stops listening
async fn pump(session: SensorSession, mut events: SensorEventStream, listen: CancellationToken) {
    loop {
        tokio::select! {
            biased;
            event = events.next() => match event {
                Some(event) => session.dispatch(event),
                None => break,
            },
            () = listen.cancelled() => break,
        }
    }
    debug!(
        "Sensor event pump finished for operation {}",
        session.operation_id()
    );
}

struct Inner {
    state: SensorState,
    self_cancelled: bool,
    publication_pending: bool,
    last_event: Option<SensorEventKind>,
    history: Vec<SensorState>,
    cipher_session: Option<CipherSession>,
    outcome_tx: Option<oneshot::Sender<SensorOutcome>>,
    outcome_rx: Option<oneshot::Receiver<SensorOutcome>>,
}

impl Inner {
    fn enter(&mut self, state: SensorState) {
        self.state = state;
        self.history.push(state);
    }
}

struct Shared {
    operation_id: OperationId,
    key_name: String,
    started_at: Instant,
    listen: CancellationToken,
    publication: CancellationToken,
    status: Arc<StatusChannel>,
    config: SensorConfig,
    runtime: Handle,
    inner: Mutex<Inner>,
}

/// Handle to one listen.
///
/// Clones share the session. Events may arrive from the driver stream or
/// be fed directly through [`SensorCallback`]; both paths apply the same
/// rules.
#[derive(Clone)]
pub struct SensorSession {
    shared: Arc<Shared>,
}

impl SensorSession {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.shared
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Operation this listen authorizes
    pub fn operation_id(&self) -> OperationId {
        self.shared.operation_id
    }

    /// When listening began
    pub fn started_at(&self) -> Instant {
        self.shared.started_at
    }

    /// Current state
    pub fn state(&self) -> SensorState {
        self.lock().state
    }

    /// Every state entered since start, in order
    pub fn history(&self) -> Vec<SensorState> {
        self.lock().history.clone()
    }

    /// Most recent event applied to the session
    pub fn last_event(&self) -> Option<SensorEventKind> {
        self.lock().last_event
    }

    /// Whether the caller stopped this session
    pub fn is_self_cancelled(&self) -> bool {
        self.lock().self_cancelled
    }

    /// Token the driver listens on; cancelled once the session stops listening
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.shared.listen
    }

    /// Future for the terminal outcome; a second call resolves to `Stopped`
    pub fn outcome(&self) -> SensorOutcomeResult {
        match self.lock().outcome_rx.take() {
            Some(receiver) => SensorOutcomeResult::new(receiver),
            None => {
                warn!(
                    "Outcome for operation {} was already taken",
                    self.shared.operation_id
                );
                SensorOutcomeResult::stopped()
            }
        }
    }

    /// Stop listening.
    ///
    /// Idempotent. Cancels a pending outcome publication, releases the
    /// sensor, and produces no status message. The echoed cancellation
    /// error from the driver is swallowed.
    pub fn stop(&self) {
        let mut inner = self.lock();
        if inner.self_cancelled {
            return;
        }
        inner.self_cancelled = true;
        self.shared.listen.cancel();
        self.shared.publication.cancel();
        self.shared.status.cancel_reset();

        if inner.state == SensorState::Listening || inner.publication_pending {
            inner.enter(SensorState::Cancelled);
            inner.publication_pending = false;
            inner.cipher_session = None;
            inner.outcome_tx = None;
            LoggingTransformer::log_auth_event("sensor_stopped", &self.shared.key_name, true);
        }
    }

    /// Apply one driver event
    pub fn dispatch(&self, event: SensorEvent) {
        match event {
            SensorEvent::FailedAttempt => self.on_failed_attempt(),
            SensorEvent::Help { code, message } => self.on_help(code, &message),
            SensorEvent::Error { code, message } => self.on_error(code, &message),
            SensorEvent::Succeeded(token) => self.on_succeeded(token),
        }
    }

    fn on_soft_event(&self, kind: SensorEventKind, message: &str) {
        {
            let mut inner = self.lock();
            if inner.state != SensorState::Listening {
                debug!("Ignoring {kind:?} in state {:?}", inner.state);
                return;
            }
            inner.last_event = Some(kind);
            inner.enter(SensorState::Listening);
        }
        self.shared
            .status
            .publish_warning(&self.shared.runtime, message);
    }

    fn fail(&self, mut inner: MutexGuard<'_, Inner>, message: &str) {
        inner.last_event = Some(SensorEventKind::Error);
        inner.enter(SensorState::Error);
        inner.cipher_session = None;
        inner.publication_pending = true;
        drop(inner);

        self.shared.listen.cancel();
        self.shared
            .status
            .publish_warning(&self.shared.runtime, message);
        LoggingTransformer::log_auth_event("sensor_error", &self.shared.key_name, false);

        let outcome = SensorOutcome::Failed {
            message: message.to_string(),
        };
        self.publish_after(self.shared.config.error_settle(), move |_| outcome);
    }

    /// Send the terminal outcome once `delay` passes, unless stopped first
    fn publish_after<F>(&self, delay: Duration, build: F)
    where
        F: FnOnce(&mut Inner) -> SensorOutcome + Send + 'static,
    {
        let session = self.clone();
        let publication = self.shared.publication.clone();
        self.shared.runtime.spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = publication.cancelled() => return,
            }
            let mut inner = session.lock();
            if !inner.publication_pending {
                return;
            }
            inner.publication_pending = false;
            let outcome = build(&mut *inner);
            if let Some(tx) = inner.outcome_tx.take() {
                // Receiver may be gone if nobody waits for the outcome
                let _ = tx.send(outcome);
            }
        });
    }
}

impl SensorCallback for SensorSession {
    fn on_failed_attempt(&self) {
        let message = self.shared.config.not_recognized_message.clone();
        self.on_soft_event(SensorEventKind::FailedAttempt, &message);
    }

    fn on_help(&self, _code: i32, message: &str) {
        self.on_soft_event(SensorEventKind::Help, message);
    }

    fn on_error(&self, code: i32, message: &str) {
        let inner = self.lock();
        if inner.self_cancelled {
            debug!("Swallowing sensor error {code} after stop");
            return;
        }
        if inner.state != SensorState::Listening {
            debug!("Ignoring sensor error {code} in state {:?}", inner.state);
            return;
        }
        self.fail(inner, message);
    }

    fn on_succeeded(&self, token: AuthToken) {
        let mut inner = self.lock();
        if inner.state != SensorState::Listening {
            debug!("Ignoring match in state {:?}", inner.state);
            return;
        }
        let authorized = match inner.cipher_session.as_mut() {
            Some(session) => session.authorize(&token),
            None => Ok(()),
        };
        match authorized {
            Ok(()) => {}
            // The match was genuine; the stale session refuses to operate.
            Err(CipherError::SessionStale(reason)) => {
                warn!("Match authorized a stale cipher session: {reason}");
            }
            Err(e) => {
                warn!("Match could not authorize cipher session: {e}");
                self.fail(inner, &e.to_string());
                return;
            }
        }

        inner.last_event = Some(SensorEventKind::Succeeded);
        inner.enter(SensorState::Succeeded);
        inner.publication_pending = true;
        drop(inner);

        self.shared.listen.cancel();
        self.shared
            .status
            .publish_success(self.shared.config.success_message.clone());
        LoggingTransformer::log_auth_event("sensor_match", &self.shared.key_name, true);

        self.publish_after(self.shared.config.success_settle(), |inner| {
            match inner.cipher_session.take() {
                Some(session) => SensorOutcome::Succeeded(session),
                None => SensorOutcome::Stopped,
            }
        });
    }
}

impl std::fmt::Debug for SensorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorSession")
            .field("operation_id", &self.shared.operation_id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!SensorState::Idle.is_terminal());
        assert!(!SensorState::Listening.is_terminal());
        assert!(SensorState::Succeeded.is_terminal());
        assert!(SensorState::Error.is_terminal());
        assert!(SensorState::Cancelled.is_terminal());
    }
}
