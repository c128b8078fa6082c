//! Configuration for BlameLens.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default trailing debounce before an edited file's blame is dropped.
pub const DEFAULT_DEBOUNCE_MS: u64 = 2500;

/// Engine configuration, usually read from `.blamelens.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlameConfig {
    /// Quiet period after the last edit or save before eviction
    pub debounce_ms: u64,
    /// Git executable
    pub git_path: String,
    /// Extra arguments passed to `git blame`
    pub blame_args: Vec<String>,
}

impl Default for BlameConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            git_path: "git".to_string(),
            blame_args: Vec::new(),
        }
    }
}

impl BlameConfig {
    /// Load configuration from a JSON file. A missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };

        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
