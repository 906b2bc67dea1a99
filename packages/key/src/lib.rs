//! # Biolock Key Management
//!
//! Creation and lookup of symmetric keys that are only usable after a live
//! biometric match.
//!
//! ## Features
//!
//! - **Secure container contract**: [`SecureKeyContainer`] hides how key
//!   material is physically held
//! - **Invalidation policy**: per-key choice of surviving new enrollment
//! - **Software container**: in-process container that simulates platform
//!   invalidation events
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use biolock_key::{KeyLifecycleManager, SoftwareKeyContainer};
//!
//! # fn main() -> Result<(), biolock_key::KeyError> {
//! let container = Arc::new(SoftwareKeyContainer::new());
//! let keys = KeyLifecycleManager::new(container);
//!
//! let record = keys.create_key("default_key", true)?;
//! assert!(record.invalidated_by_new_enrollment);
//! assert!(keys.has_key("default_key"));
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod error;
pub mod manager;
pub mod material;
pub mod record;
pub mod store;
pub mod traits;

pub use error::{KeyError, Result};
pub use manager::KeyLifecycleManager;
pub use material::KeyMaterial;
pub use record::{KeyPolicy, KeyRecord, LoadedKey};
pub use store::SoftwareKeyContainer;
pub use traits::{ContainerHandle, SecureKeyContainer};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ContainerHandle, KeyError, KeyLifecycleManager, KeyPolicy, KeyRecord, Result,
        SecureKeyContainer, SoftwareKeyContainer,
    };
}
