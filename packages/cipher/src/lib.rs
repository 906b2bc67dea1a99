//! # Biolock Cipher
//!
//! Cipher sessions over biometric-bound keys. A session is opened for a
//! named key, waits for a live biometric match, and then performs exactly
//! one encryption or decryption.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

/// Encryption and decryption primitives
pub mod cipher;
pub mod config;
pub mod error;
pub mod factory;
pub mod ledger;
pub mod session;

pub use cipher::{CipherAlgorithm, SealedPayload};
pub use config::CipherConfig;
pub use error::{CipherError, InitError, Result};
pub use factory::CipherSessionFactory;
pub use ledger::SessionLedger;
pub use session::{AuthToken, CipherMode, CipherSession, OperationId, SessionState};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AuthToken, CipherAlgorithm, CipherConfig, CipherError, CipherMode, CipherSession,
        CipherSessionFactory, InitError, OperationId, Result, SealedPayload, SessionState,
    };
}
