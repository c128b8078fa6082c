//! Test utilities for BlameLens.
//!
//! Provides a builder for porcelain blame streams and an in-memory blame source.

use crate::error::{Error, Result};
use crate::source::BlameSource;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A 40-character hash made of one repeated hex digit.
pub fn sha(c: char) -> String {
    std::iter::repeat(c).take(40).collect()
}

/// Metadata for one commit in a porcelain stream.
#[derive(Debug, Clone)]
pub struct CommitFixture {
    sha: String,
    author: String,
    time: i64,
    tz: String,
    summary: String,
    filename: String,
    previous: Option<(String, String)>,
    boundary: bool,
}

impl CommitFixture {
    pub fn new(sha: &str, author: &str, time: i64) -> Self {
        Self {
            sha: sha.to_string(),
            author: author.to_string(),
            time,
            tz: "+0000".to_string(),
            summary: format!("commit {}", &sha[..8]),
            filename: "foo.txt".to_string(),
            previous: None,
            boundary: false,
        }
    }

    pub fn tz(mut self, tz: &str) -> Self {
        self.tz = tz.to_string();
        self
    }

    pub fn filename(mut self, filename: &str) -> Self {
        self.filename = filename.to_string();
        self
    }

    pub fn previous(mut self, sha: &str, filename: &str) -> Self {
        self.previous = Some((sha.to_string(), filename.to_string()));
        self
    }

    pub fn boundary(mut self) -> Self {
        self.boundary = true;
        self
    }

    fn write_metadata(&self, out: &mut String) {
        let email = format!("<{}@example.com>", self.author.trim().to_lowercase());
        out.push_str(&format!("author {}\n", self.author));
        out.push_str(&format!("author-mail {}\n", email));
        out.push_str(&format!("author-time {}\n", self.time));
        out.push_str(&format!("author-tz {}\n", self.tz));
        out.push_str(&format!("committer {}\n", self.author));
        out.push_str(&format!("committer-mail {}\n", email));
        out.push_str(&format!("committer-time {}\n", self.time));
        out.push_str(&format!("committer-tz {}\n", self.tz));
        out.push_str(&format!("summary {}\n", self.summary));
        if let Some((sha, filename)) = &self.previous {
            out.push_str(&format!("previous {} {}\n", sha, filename));
        }
        if self.boundary {
            out.push_str("boundary\n");
        }
        out.push_str(&format!("filename {}\n", self.filename));
    }
}

/// Builds porcelain output the way `git blame --porcelain` lays it out:
/// metadata only on the first record of each commit.
#[derive(Debug, Default)]
pub struct PorcelainBuilder {
    commits: HashMap<String, CommitFixture>,
    seen: HashSet<String>,
    next_line: usize,
    out: String,
}

impl PorcelainBuilder {
    pub fn new() -> Self {
        Self {
            next_line: 1,
            ..Self::default()
        }
    }

    /// Register commit metadata.
    pub fn commit(mut self, commit: CommitFixture) -> Self {
        self.commits.insert(commit.sha.clone(), commit);
        self
    }

    /// Append the next line of the file (1-indexed original line).
    pub fn line(self, sha: &str, original_line: usize) -> Self {
        let final_line = self.next_line;
        self.line_at(sha, original_line, final_line)
    }

    /// Append a record at an explicit final line (both 1-indexed).
    pub fn line_at(mut self, sha: &str, original_line: usize, final_line: usize) -> Self {
        self.out
            .push_str(&format!("{} {} {} 1\n", sha, original_line, final_line));
        if self.seen.insert(sha.to_string()) {
            if let Some(commit) = self.commits.get(sha) {
                commit.write_metadata(&mut self.out);
            }
        }
        self.out.push_str(&format!("\tcode line {}\n", final_line));
        self.next_line = final_line + 1;
        self
    }

    pub fn build(self) -> String {
        self.out
    }
}

/// In-memory blame source that counts fetches.
#[derive(Debug, Default)]
pub struct MemorySource {
    files: Mutex<HashMap<String, Result<String>>>,
    fetches: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the porcelain output returned for `file_name`.
    pub fn set(&self, file_name: &str, data: impl Into<String>) {
        self.files
            .lock()
            .unwrap()
            .insert(file_name.to_string(), Ok(data.into()));
    }

    /// Make fetches for `file_name` fail.
    pub fn fail(&self, file_name: &str, error: Error) {
        self.files
            .lock()
            .unwrap()
            .insert(file_name.to_string(), Err(error));
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlameSource for MemorySource {
    async fn blame_porcelain(&self, file_name: &str, _repo_root: &Path) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.files
            .lock()
            .unwrap()
            .get(file_name)
            .cloned()
            .unwrap_or_else(|| Err(Error::NotUnderVersionControl(file_name.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_porcelain_builder_emits_metadata_once() {
        let a = sha('a');
        let data = PorcelainBuilder::new()
            .commit(CommitFixture::new(&a, "Alice", 1_000))
            .line(&a, 1)
            .line(&a, 2)
            .build();

        assert_eq!(data.matches("author Alice").count(), 1);
        assert_eq!(data.matches(&a).count(), 2);
        assert!(data.contains(&format!("{} 2 2 1\n", a)));
    }
}
