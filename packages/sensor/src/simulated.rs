//! In-process sensor and lock screen for tests and demos

use crate::{BiometricSensor, LockScreen, Result, SensorError, SensorEvent, SensorEventStream};
use crate::UnavailableReason;
use biolock_cipher::{AuthToken, OperationId};
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;

/// Error code reported when a listen is cancelled
pub const ERROR_CANCELED: i32 = 5;

const CANCELED_MESSAGE: &str = "Fingerprint operation canceled.";

struct ActiveListen {
    operation: OperationId,
    events: mpsc::UnboundedSender<SensorEvent>,
}

/// Scriptable sensor driver.
///
/// Tests push events with [`emit`](Self::emit) or the helpers; cancelling a
/// listen is echoed back as an `Error` with [`ERROR_CANCELED`], as real
/// drivers do.
pub struct SimulatedSensor {
    present: AtomicBool,
    enrolled: AtomicBool,
    listens: AtomicUsize,
    active: Mutex<Option<ActiveListen>>,
    refusal: Mutex<Option<String>>,
}

impl SimulatedSensor {
    /// Sensor with hardware and one enrolled biometric
    #[must_use]
    pub fn new() -> Self {
        Self {
            present: AtomicBool::new(true),
            enrolled: AtomicBool::new(true),
            listens: AtomicUsize::new(0),
            active: Mutex::new(None),
            refusal: Mutex::new(None),
        }
    }

    /// Sensor without hardware
    #[must_use]
    pub fn without_hardware() -> Self {
        let sensor = Self::new();
        sensor.set_present(false);
        sensor
    }

    /// Sensor with hardware but nothing enrolled
    #[must_use]
    pub fn without_enrollment() -> Self {
        let sensor = Self::new();
        sensor.set_enrolled(false);
        sensor
    }

    /// Toggle hardware presence
    pub fn set_present(&self, present: bool) {
        self.present.store(present, Ordering::SeqCst);
    }

    /// Toggle enrollment
    pub fn set_enrolled(&self, enrolled: bool) {
        self.enrolled.store(enrolled, Ordering::SeqCst);
    }

    /// Make the next `authenticate` call fail with `SensorError::Driver`
    pub fn refuse_next_listen(&self, reason: &str) {
        *self.refusal.lock().unwrap_or_else(PoisonError::into_inner) = Some(reason.to_string());
    }

    /// Number of listens started so far
    #[must_use]
    pub fn listen_count(&self) -> usize {
        self.listens.load(Ordering::SeqCst)
    }

    /// Operation of the most recent listen
    #[must_use]
    pub fn active_operation(&self) -> Option<OperationId> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|listen| listen.operation)
    }

    /// Deliver `event` to the most recent listen; false if nobody listens
    pub fn emit(&self, event: SensorEvent) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|listen| listen.events.send(event).is_ok())
    }

    /// Scan that does not match
    pub fn reject(&self) -> bool {
        self.emit(SensorEvent::FailedAttempt)
    }

    /// Recoverable scan problem
    pub fn help(&self, message: &str) -> bool {
        self.emit(SensorEvent::Help {
            code: 1,
            message: message.to_string(),
        })
    }

    /// Fatal error such as a lockout
    pub fn fail(&self, code: i32, message: &str) -> bool {
        self.emit(SensorEvent::Error {
            code,
            message: message.to_string(),
        })
    }

    /// Matching scan for the active listen
    pub fn accept(&self) -> bool {
        match self.active_operation() {
            Some(operation) => self.emit(SensorEvent::Succeeded(AuthToken::new(operation))),
            None => false,
        }
    }
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl BiometricSensor for SimulatedSensor {
    fn is_present(&self) -> bool {
        self.present.load(Ordering::SeqCst)
    }

    fn has_enrollment(&self) -> bool {
        self.enrolled.load(Ordering::SeqCst)
    }

    fn authenticate(
        &self,
        operation: OperationId,
        cancel: CancellationToken,
    ) -> Result<SensorEventStream> {
        if !self.is_present() {
            return Err(SensorError::Unavailable(UnavailableReason::NoHardware));
        }
        let refusal = self
            .refusal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(reason) = refusal {
            return Err(SensorError::Driver(reason));
        }

        let (events, receiver) = mpsc::unbounded_channel();
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(ActiveListen { operation, events });
        self.listens.fetch_add(1, Ordering::SeqCst);

        let echo = futures::stream::once(async move {
            cancel.cancelled().await;
            SensorEvent::Error {
                code: ERROR_CANCELED,
                message: CANCELED_MESSAGE.to_string(),
            }
        });

        Ok(futures::stream::select(UnboundedReceiverStream::new(receiver), echo).boxed())
    }
}

/// Lock screen whose security can be toggled
#[derive(Debug)]
pub struct SimulatedLockScreen {
    secure: AtomicBool,
}

impl SimulatedLockScreen {
    /// Lock screen in the given state
    #[must_use]
    pub fn new(secure: bool) -> Self {
        Self {
            secure: AtomicBool::new(secure),
        }
    }

    /// Change whether the lock screen is secure
    pub fn set_secure(&self, secure: bool) {
        self.secure.store(secure, Ordering::SeqCst);
    }
}

impl Default for SimulatedLockScreen {
    fn default() -> Self {
        Self::new(true)
    }
}

impl LockScreen for SimulatedLockScreen {
    fn is_secure(&self) -> bool {
        self.secure.load(Ordering::SeqCst)
    }
}
