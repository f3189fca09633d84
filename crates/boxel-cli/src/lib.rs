//! boxel CLI library
//!
//! Configuration loading, error rendering and the command implementations
//! behind the `boxel` binary.

pub mod commands;
pub mod config;
pub mod diagnostics;

// CLI-specific error handling
pub mod error {
    use std::path::PathBuf;

    use miette::Diagnostic;
    use thiserror::Error;

    #[derive(Error, Debug, Diagnostic)]
    pub enum CliError {
        #[error("IO error: {0}")]
        #[diagnostic(code(boxel::cli::io))]
        Io(#[from] std::io::Error),

        #[error("Configuration error: {0}")]
        #[diagnostic(
            code(boxel::cli::config),
            help("check boxel.toml against the documented [runtime], [lowering] and [output] tables")
        )]
        Config(String),

        #[error("Invalid input module `{path}`: {message}")]
        #[diagnostic(
            code(boxel::cli::input),
            help("the input must be a JSON-encoded module as produced by the front end")
        )]
        InvalidInput { path: PathBuf, message: String },

        #[error(transparent)]
        #[diagnostic(transparent)]
        Lowering(#[from] boxel_core::Error),

        #[error("{count} unsupported operation(s) were lowered to placeholders")]
        #[diagnostic(
            code(boxel::cli::unsupported),
            help("rerun without --deny-unsupported to accept placeholder output")
        )]
        UnsupportedDenied { count: usize },
    }

    pub type Result<T> = std::result::Result<T, CliError>;
}

pub use error::{CliError, Result};
