//! Built-in key container implementations

mod software;

pub use software::{SoftwareContainerHandle, SoftwareKeyContainer};
