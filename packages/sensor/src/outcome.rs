//! Terminal outcome of a sensor session

use biolock_cipher::CipherSession;
use biolock_common::NotResult;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// How a sensor session ended
#[derive(Debug)]
pub enum SensorOutcome {
    /// Live match; the session is authorized for one use
    Succeeded(CipherSession),
    /// Fatal sensor error; callers should fall back to another credential
    Failed {
        /// Error text reported by the sensor
        message: String,
    },
    /// Stopped by the caller; no outcome was produced
    Stopped,
}

impl SensorOutcome {
    /// Whether this is a successful match
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

/// Future resolving to the session outcome once the settle delay has passed
#[derive(Debug)]
pub struct SensorOutcomeResult {
    receiver: Option<oneshot::Receiver<SensorOutcome>>,
}

/// Outcome future with a caller-supplied handler
pub struct SensorOutcomeWithHandler<F> {
    receiver: Option<oneshot::Receiver<SensorOutcome>>,
    handler: Option<F>,
}

impl SensorOutcomeResult {
    pub(crate) fn new(receiver: oneshot::Receiver<SensorOutcome>) -> Self {
        Self {
            receiver: Some(receiver),
        }
    }

    /// Outcome that is already known to be `Stopped`
    #[must_use]
    pub fn stopped() -> Self {
        Self { receiver: None }
    }

    /// Map the outcome through `handler`
    pub fn on_outcome<F, T>(self, handler: F) -> SensorOutcomeWithHandler<F>
    where
        F: FnOnce(SensorOutcome) -> T,
    {
        SensorOutcomeWithHandler {
            receiver: self.receiver,
            handler: Some(handler),
        }
    }
}

fn poll_receiver(
    receiver: &mut Option<oneshot::Receiver<SensorOutcome>>,
    cx: &mut Context<'_>,
) -> Poll<SensorOutcome> {
    let Some(rx) = receiver.as_mut() else {
        return Poll::Ready(SensorOutcome::Stopped);
    };
    match Pin::new(rx).poll(cx) {
        Poll::Ready(outcome) => {
            *receiver = None;
            // A dropped sender means the session was stopped
            Poll::Ready(outcome.unwrap_or(SensorOutcome::Stopped))
        }
        Poll::Pending => Poll::Pending,
    }
}

impl Future for SensorOutcomeResult {
    type Output = SensorOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        poll_receiver(&mut self.receiver, cx)
    }
}

impl<F, T> Future for SensorOutcomeWithHandler<F>
where
    F: FnOnce(SensorOutcome) -> T + Unpin,
    T: NotResult,
{
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match poll_receiver(&mut this.receiver, cx) {
            Poll::Ready(outcome) => match this.handler.take() {
                Some(handler) => Poll::Ready(handler(outcome)),
                None => Poll::Pending,
            },
            Poll::Pending => Poll::Pending,
        }
    }
}
