//! Common infrastructure shared by the biolock crates
//!
//! - Logging bootstrap with redaction of key names
//! - The `NotResult` marker used by handler-style result futures

#![forbid(unsafe_code)]

pub mod logging;
pub mod traits;

pub use logging::LoggingTransformer;
pub use traits::NotResult;
