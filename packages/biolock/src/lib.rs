//! # Biolock
//!
//! Biometric-gated authorization. A key that can only be used after a live
//! biometric match is created once; each authorization attempt opens a
//! single-use cipher session for it, listens on the sensor, and resolves to
//! exactly one outcome.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use biolock::prelude::*;
//!
//! # async fn demo() -> Result<(), AuthError> {
//! let coordinator = AuthorizationCoordinator::new(
//!     Arc::new(SoftwareKeyContainer::new()),
//!     Arc::new(SimulatedSensor::new()),
//!     Arc::new(SimulatedLockScreen::new(true)),
//! );
//!
//! coordinator.enroll_default_key()?;
//! let pending = coordinator.authorize("default_key")?;
//!
//! match pending.outcome().await {
//!     AuthOutcome::Authenticated { cipher_session } => {
//!         let sealed = cipher_session.encrypt(b"Very secret message")?;
//!         println!("{}", sealed.to_base64());
//!     }
//!     AuthOutcome::FallbackRequested(reason) => println!("use a password: {reason}"),
//!     AuthOutcome::Cancelled => {}
//! }
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod callback;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod outcome;

pub use callback::AuthCallbacks;
pub use config::AuthConfig;
pub use coordinator::{AuthorizationCanceller, AuthorizationCoordinator, PendingAuthorization};
pub use error::{AuthError, Result};
pub use outcome::{AuthOutcome, FallbackReason};

pub use biolock_cipher as cipher;
pub use biolock_common as common;
pub use biolock_key as key;
pub use biolock_sensor as sensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AuthCallbacks, AuthConfig, AuthError, AuthOutcome, AuthorizationCoordinator,
        FallbackReason, PendingAuthorization,
    };
    pub use biolock_cipher::{CipherMode, CipherSession, SealedPayload};
    pub use biolock_common::LoggingTransformer;
    pub use biolock_key::SoftwareKeyContainer;
    pub use biolock_sensor::{
        SimulatedLockScreen, SimulatedSensor, StatusUpdate, UnavailableReason,
    };
}
