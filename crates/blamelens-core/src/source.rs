//! The external producer of raw blame text.

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Produces porcelain blame output for a file.
///
/// Implementations fail with [`Error::NotUnderVersionControl`] for untracked
/// files and [`Error::CommandUnavailable`] when the backing tool is missing.
///
/// [`Error::NotUnderVersionControl`]: crate::Error::NotUnderVersionControl
/// [`Error::CommandUnavailable`]: crate::Error::CommandUnavailable
#[async_trait]
pub trait BlameSource: Send + Sync {
    /// Porcelain blame text for `file_name`, relative to `repo_root`.
    async fn blame_porcelain(&self, file_name: &str, repo_root: &Path) -> Result<String>;
}
