//! Git repository discovery.

use blamelens_core::normalize_path;
use git2::Repository;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    #[error("Repository at {0} has no working tree")]
    Bare(PathBuf),
}

/// Result type for git operations.
pub type Result<T> = std::result::Result<T, GitError>;

impl From<GitError> for blamelens_core::Error {
    fn from(err: GitError) -> Self {
        match err {
            GitError::NotARepository(path) | GitError::Bare(path) => {
                blamelens_core::Error::NotUnderVersionControl(path.display().to_string())
            }
            GitError::Git(e) => blamelens_core::Error::Source(e.to_string()),
        }
    }
}

/// A repository's working tree.
///
/// Only the root is kept; `git2::Repository` handles are opened per call
/// since they cannot be shared between threads.
#[derive(Debug, Clone)]
pub struct GitRepository {
    root: PathBuf,
}

impl GitRepository {
    /// Find the repository containing `path`, searching upwards.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let repo = Repository::discover(path).map_err(|e| match e.code() {
            git2::ErrorCode::NotFound => GitError::NotARepository(path.to_path_buf()),
            _ => GitError::Git(e),
        })?;

        let root = repo
            .workdir()
            .ok_or_else(|| GitError::Bare(repo.path().to_path_buf()))?
            .components()
            .collect();

        Ok(Self { root })
    }

    /// Root of the working tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of `file` relative to the root, `/`-separated.
    pub fn relative_path(&self, file: &Path) -> String {
        normalize_path(&file.to_string_lossy(), &self.root)
    }

    /// Whether `file` is in the index.
    pub fn is_tracked(&self, file: &Path) -> Result<bool> {
        let repo = Repository::open(&self.root)?;
        let index = repo.index()?;
        let relative = self.relative_path(file);
        Ok(index.get_path(Path::new(&relative), 0).is_some())
    }
}
