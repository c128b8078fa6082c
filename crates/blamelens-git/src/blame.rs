//! Porcelain blame output from the git executable.

use async_trait::async_trait;
use blamelens_core::{BlameConfig, BlameSource, Error, Result};
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Runs `git blame --porcelain` for each request.
#[derive(Debug, Clone)]
pub struct GitBlameSource {
    git_path: String,
    extra_args: Vec<String>,
}

impl Default for GitBlameSource {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitBlameSource {
    pub fn new(git_path: impl Into<String>) -> Self {
        Self {
            git_path: git_path.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn from_config(config: &BlameConfig) -> Self {
        Self::new(config.git_path.clone()).with_args(config.blame_args.clone())
    }

    /// Extra arguments placed before the file name, e.g. `-w` or `-M`.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    fn command(&self, file_name: &str, repo_root: &Path) -> Command {
        let mut cmd = Command::new(&self.git_path);
        cmd.current_dir(repo_root)
            .arg("blame")
            .arg("--porcelain")
            .args(&self.extra_args)
            .arg("--")
            .arg(file_name)
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl BlameSource for GitBlameSource {
    async fn blame_porcelain(&self, file_name: &str, repo_root: &Path) -> Result<String> {
        debug!(file = file_name, root = %repo_root.display(), "Running git blame");

        let output = self
            .command(file_name, repo_root)
            .output()
            .await
            .map_err(|e| spawn_error(&self.git_path, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(file_name, &stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn spawn_error(git_path: &str, err: std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::NotFound {
        Error::CommandUnavailable(format!("{}: {}", git_path, err))
    } else {
        err.into()
    }
}

/// Map a failed `git blame` to an error kind from its stderr.
fn classify_failure(file_name: &str, stderr: &str) -> Error {
    let lower = stderr.to_lowercase();
    let untracked = [
        "no such path",
        "no such file",
        "not in the working tree",
        "not a git repository",
        "outside repository",
    ];

    if untracked.iter().any(|pattern| lower.contains(pattern)) {
        Error::NotUnderVersionControl(file_name.to_string())
    } else {
        Error::Source(stderr.trim().to_string())
    }
}
