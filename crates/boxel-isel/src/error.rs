pub use boxel_core::error::{Error, Result};

/// Create an untyped instruction-selection error.
pub fn isel_error(message: impl Into<String>) -> Error {
    Error::Generic(message.into())
}

/// Return early with an instruction-selection error.
///
/// Accepts either an [`Error`] value or a format string.
#[macro_export]
macro_rules! isel_bail {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        return Err($crate::error::isel_error(format!($fmt $(, $arg)*)))
    };
    ($err:expr) => {
        return Err($err)
    };
}

/// Ensure a condition holds, or return the given error.
#[macro_export]
macro_rules! isel_ensure {
    ($cond:expr, $($rest:tt)+) => {
        if !($cond) {
            $crate::isel_bail!($($rest)+);
        }
    };
}
