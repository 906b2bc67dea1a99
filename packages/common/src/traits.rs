//! Common traits used across the biolock crates

/// Marker for values an `on_result` handler may return.
///
/// Handlers decide what happens on error and hand back an unwrapped value,
/// so `Result` is intentionally not implemented here.
pub trait NotResult {}

impl NotResult for bool {}
impl NotResult for () {}
impl<T> NotResult for Vec<T> {}
impl NotResult for String {}
impl<T> NotResult for Option<T> {}
impl NotResult for u8 {}
impl NotResult for u32 {}
impl NotResult for u64 {}
impl NotResult for usize {}
impl NotResult for i32 {}
impl NotResult for i64 {}
impl NotResult for &str {}
impl<T> NotResult for Box<T> {}
impl<T> NotResult for std::sync::Arc<T> {}

impl<T, U> NotResult for (T, U)
where
    T: NotResult,
    U: NotResult,
{
}
