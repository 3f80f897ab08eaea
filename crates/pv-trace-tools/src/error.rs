//! Trace tooling error types.

use thiserror::Error;

/// Errors raised while reading trace input.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("source not found: {0}")]
    NotFound(String),
}

impl TraceError {
    pub(crate) fn from_io(path: &std::path::Path, e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path.display().to_string())
        } else {
            Self::Io(format!("{}: {e}", path.display()))
        }
    }
}

/// Convenience alias for trace tooling results.
pub type TraceResult<T> = Result<T, TraceError>;
