//! Status messages for whatever UI observes the sensor

use crate::SensorConfig;
use log::trace;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const STATUS_CAPACITY: usize = 32;

/// How a status message should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Neutral instruction
    Hint,
    /// Recoverable problem or error
    Warning,
    /// Match accepted
    Success,
}

/// One status message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// Text to display
    pub message: String,
    /// Rendering hint
    pub severity: Severity,
}

impl StatusUpdate {
    /// Build an update
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }
}

/// Broadcast channel for status messages.
///
/// Warnings revert to the hint after the reset window. A newer warning
/// supersedes a pending reset, and a success or stop cancels it.
#[derive(Debug)]
pub struct StatusChannel {
    sender: broadcast::Sender<StatusUpdate>,
    pending_reset: Mutex<Option<JoinHandle<()>>>,
    hint: String,
    reset_after: Duration,
}

impl StatusChannel {
    /// Channel using the hint text and reset window from `config`
    #[must_use]
    pub fn new(config: &SensorConfig) -> Self {
        let (sender, _) = broadcast::channel(STATUS_CAPACITY);
        Self {
            sender,
            pending_reset: Mutex::new(None),
            hint: config.hint_message.clone(),
            reset_after: config.status_reset(),
        }
    }

    /// Receive every update published from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StatusUpdate> {
        self.sender.subscribe()
    }

    /// Publish the neutral hint
    pub fn publish_hint(&self) {
        self.publish(StatusUpdate::new(self.hint.clone(), Severity::Hint));
    }

    /// Publish a warning and schedule the revert to the hint
    pub fn publish_warning(&self, runtime: &Handle, message: impl Into<String>) {
        self.publish(StatusUpdate::new(message, Severity::Warning));

        let sender = self.sender.clone();
        let hint = self.hint.clone();
        let reset_after = self.reset_after;
        let reset = runtime.spawn(async move {
            tokio::time::sleep(reset_after).await;
            let _ = sender.send(StatusUpdate::new(hint, Severity::Hint));
        });

        let previous = self
            .pending_reset
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(reset);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Publish a success; any pending revert is cancelled first
    pub fn publish_success(&self, message: impl Into<String>) {
        self.cancel_reset();
        self.publish(StatusUpdate::new(message, Severity::Success));
    }

    /// Drop a pending revert without publishing anything
    pub fn cancel_reset(&self) {
        let pending = self
            .pending_reset
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(pending) = pending {
            pending.abort();
        }
    }

    fn publish(&self, update: StatusUpdate) {
        trace!("status: {:?} {}", update.severity, update.message);
        // No subscribers is not an error
        let _ = self.sender.send(update);
    }
}
