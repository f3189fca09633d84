use std::io;
use std::path::PathBuf;
use std::result;

use miette::Diagnostic;
use thiserror::Error;

use crate::mir::{BlockId, ExprKind, StmtLocation};

/// Fatal conditions of a lowering session. Any of these aborts the session;
/// unsupported expressions are reported separately and never land here.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("runtime definition `{}` could not be read", path.display())]
    #[diagnostic(
        code(boxel::runtime::unavailable),
        help("pass --runtime <path> or set [runtime] path in boxel.toml")
    )]
    RuntimeUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("runtime definition `{}` is malformed: {message}", path.display())]
    #[diagnostic(code(boxel::runtime::malformed))]
    RuntimeMalformed { path: PathBuf, message: String },

    #[error("failed to link runtime symbol `{symbol}`: {reason}")]
    #[diagnostic(code(boxel::runtime::link))]
    RuntimeLink { symbol: String, reason: String },

    #[error("runtime type `{name}` is not defined")]
    #[diagnostic(code(boxel::catalog::missing_type))]
    MissingRuntimeType { name: String },

    #[error("runtime helper `{name}` is not declared")]
    #[diagnostic(code(boxel::catalog::missing_helper))]
    MissingRuntimeHelper { name: String },

    #[error("runtime helper `{name}` has signature `{found}`, expected `{expected}`")]
    #[diagnostic(code(boxel::catalog::helper_signature))]
    HelperSignature {
        name: String,
        expected: String,
        found: String,
    },

    #[error("{location}: assignment target must be a temporary, found {found}")]
    #[diagnostic(code(boxel::isel::assign_target))]
    AssignTarget {
        location: StmtLocation,
        found: ExprKind,
    },

    #[error("{location}: return operand must be a temporary, found {found}")]
    #[diagnostic(
        code(boxel::isel::return_operand),
        help("materialize the returned value into a temporary first")
    )]
    ReturnOperand {
        location: StmtLocation,
        found: ExprKind,
    },

    #[error("{location}: cannot store a value of type `{found}` through `{expected}`")]
    #[diagnostic(code(boxel::isel::type_mismatch))]
    TypeMismatch {
        location: StmtLocation,
        expected: String,
        found: String,
    },

    #[error("{location}: `{marker}` regions are not supported by instruction selection")]
    #[diagnostic(code(boxel::isel::unsupported_region))]
    UnsupportedRegion {
        location: StmtLocation,
        marker: &'static str,
    },

    #[error("{location}: temporary t{index} is out of range (function has {temp_count})")]
    #[diagnostic(code(boxel::isel::temporary_range))]
    TemporaryOutOfRange {
        location: StmtLocation,
        index: u32,
        temp_count: u32,
    },

    #[error("{location}: branch target {block} does not exist")]
    #[diagnostic(code(boxel::isel::unknown_block))]
    UnknownBlock {
        location: StmtLocation,
        block: BlockId,
    },

    #[error("function `{function}` has no basic blocks")]
    #[diagnostic(code(boxel::isel::empty_function))]
    EmptyFunction { function: String },

    #[error("{0}")]
    #[diagnostic(code(boxel::generic))]
    Generic(String),
}

pub type Result<T> = result::Result<T, Error>;

impl Error {
    pub fn generic(message: impl Into<String>) -> Self {
        Error::Generic(message.into())
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Generic(e.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Generic(s)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Generic(e.to_string())
    }
}
