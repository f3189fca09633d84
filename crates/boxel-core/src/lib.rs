pub mod diagnostics;
pub mod error;
pub mod lir;
pub mod mir;
pub mod pretty;
pub mod runtime;

// Re-export commonly used items for convenience
pub use tracing;

pub use runtime::RuntimeDefinition;

// Alias for error types
pub type Error = crate::error::Error;
pub type Result<T> = crate::error::Result<T>;
