//! Error types for BlameLens.

use std::sync::Arc;
use thiserror::Error;

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// BlameLens error types.
///
/// Errors are `Clone` because a single failed blame computation is handed to
/// every caller waiting on the same cached future.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The file is untracked or lies outside the repository
    #[error("File is not under version control: {0}")]
    NotUnderVersionControl(String),

    /// The git executable could not be started
    #[error("Git command unavailable: {0}")]
    CommandUnavailable(String),

    /// The blame source failed for another reason
    #[error("Blame source error: {0}")]
    Source(String),

    /// The pending fetch was cancelled by the caller
    #[error("Blame request cancelled")]
    Cancelled,

    /// IO error
    #[error("IO error: {0}")]
    Io(Arc<std::io::Error>),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(Arc::new(err))
    }
}
