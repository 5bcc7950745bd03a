//! Error type shared by the runtime, engines and the request dispatcher.

use std::io;
use std::path::PathBuf;

use rosie_core::Status;

/// Failures that abort an operation.
///
/// Problems in user-supplied patterns or package sources are not errors:
/// they are reported as [`Violation`](crate::Violation)s inside a successful
/// response, so a host can show them to its user.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("rosie is not initialized")]
    NotInitialized,

    #[error("rosie is already initialized with home {}", .home.display())]
    AlreadyInitialized { home: PathBuf },

    #[error("engine creation failed: {0}")]
    EngineCreationFailed(String),

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("unknown engine: {0}")]
    UnknownEngine(String),

    #[error("invalid compiled pattern: {0}")]
    InvalidPattern(i32),

    #[error("invalid output encoder: {0}")]
    InvalidEncoder(String),

    #[error("invalid trace style: {0}")]
    InvalidTraceStyle(String),

    #[error("module not found: {0}")]
    ModuleNotFound(String),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Status code reported at the C boundary.
    pub fn status(&self) -> Status {
        match self {
            Error::InvalidArgument(_) => Status::InvalidArgument,
            Error::NotInitialized => Status::NotInitialized,
            Error::AlreadyInitialized { .. } => Status::AlreadyInitialized,
            Error::EngineCreationFailed(_) => Status::EngineCreationFailed,
            Error::UnknownOperation(_) => Status::UnknownOperation,
            Error::UnknownEngine(_) => Status::UnknownEngine,
            Error::InvalidPattern(_) => Status::InvalidPattern,
            Error::InvalidEncoder(_) => Status::InvalidEncoder,
            Error::InvalidTraceStyle(_) => Status::InvalidTraceStyle,
            Error::ModuleNotFound(_) => Status::ModuleNotFound,
            Error::Io { .. } => Status::Io,
            Error::Internal(_) => Status::Internal,
        }
    }
}

/// Result type for runtime and engine operations.
pub type Result<T> = std::result::Result<T, Error>;
