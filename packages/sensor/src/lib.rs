//! # Biolock Sensor
//!
//! Owns the asynchronous listen/cancel lifecycle against a biometric
//! sensor. Raw sensor events drive a small state machine:
//!
//! ```text
//! Idle -> Listening -> { Succeeded | Error | Cancelled }
//!            ^   |
//!            +---+  failed attempt / help (soft, keeps listening)
//! ```
//!
//! Terminal outcomes are published after a short settle delay so a UI can
//! show the final status message; `stop()` during that delay cancels the
//! publication.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod availability;
pub mod callback;
pub mod config;
pub mod device;
pub mod error;
pub mod outcome;
pub mod session;
pub mod simulated;
pub mod status;

pub use availability::{DeviceCapabilities, UnavailableReason};
pub use callback::SensorCallback;
pub use config::SensorConfig;
pub use device::{BiometricSensor, LockScreen, SensorEvent, SensorEventStream};
pub use error::{Result, SensorError};
pub use outcome::{SensorOutcome, SensorOutcomeResult};
pub use session::{BiometricSensorSession, SensorEventKind, SensorSession, SensorState};
pub use simulated::{SimulatedLockScreen, SimulatedSensor, ERROR_CANCELED};
pub use status::{Severity, StatusChannel, StatusUpdate};
