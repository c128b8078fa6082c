//! File path normalization and cache keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Normalize a file path to a `/`-separated path relative to `repo_root`.
///
/// Absolute paths under the root lose the root prefix (compared without
/// regard to case). Absolute paths elsewhere stay absolute, so they never
/// collide with a relative path inside the repository.
pub fn normalize_path(file_name: &str, repo_root: &Path) -> String {
    let file_name = file_name.replace('\\', "/");
    let root = repo_root.to_string_lossy().replace('\\', "/");
    let root = root.trim_end_matches('/');

    let mut path = file_name.as_str();
    if !root.is_empty()
        && path.len() > root.len()
        && path.is_char_boundary(root.len())
        && path[..root.len()].eq_ignore_ascii_case(root)
        && path[root.len()..].starts_with('/')
    {
        path = path[root.len()..].trim_start_matches('/');
    }

    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    path.to_string()
}

/// Case-insensitive cache key for a normalized path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for an already normalized path.
    pub fn from_normalized(path: &str) -> Self {
        Self(path.to_lowercase())
    }

    /// Normalize `file_name` against `repo_root` and build its key.
    pub fn new(file_name: &str, repo_root: &Path) -> Self {
        Self::from_normalized(&normalize_path(file_name, repo_root))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
