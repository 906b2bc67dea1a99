mod aead;
mod algorithm;
mod sealed;

pub(crate) use self::aead::{open, seal};
pub use self::algorithm::CipherAlgorithm;
pub use self::sealed::SealedPayload;
