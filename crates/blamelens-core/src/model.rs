//! Blame record model: authors, commits and per-line attribution.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Number of hex characters kept from a full commit hash.
pub const SHORT_SHA_LEN: usize = 8;

/// Truncate a commit hash to its short form.
pub fn short_sha(sha: &str) -> &str {
    sha.get(..SHORT_SHA_LEN).unwrap_or(sha)
}

/// A contiguous, inclusive range of zero-based line numbers in the current file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineRange {
    /// First line (0-indexed)
    pub start: usize,
    /// Last line (0-indexed, inclusive)
    pub end: usize,
}

impl LineRange {
    /// Create a new range.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A range covering a single line.
    pub fn line(line: usize) -> Self {
        Self::new(line, line)
    }

    /// Check whether a line falls inside the range.
    pub fn contains(&self, line: usize) -> bool {
        line >= self.start && line <= self.end
    }
}

/// An author, unique by name within one blame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    /// Trimmed author name
    pub name: String,
    /// Lines attributed to this author across all of their commits
    pub line_count: usize,
}

impl Author {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            line_count: 0,
        }
    }
}

/// Attribution of one line of the current file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitLine {
    /// Short hash of the owning commit
    pub sha: String,
    /// Line in the current version of the file (0-indexed)
    pub line: usize,
    /// Line in the commit's version of the file (0-indexed)
    pub original_line: usize,
}

/// A commit that contributes lines to the current file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    /// Short hash
    pub sha: String,
    /// Path of the blamed file, relative to the repository root
    pub file_name: String,
    /// Name of the owning author
    pub author: String,
    /// Author email, without angle brackets
    pub author_email: String,
    /// Author timestamp, with the recorded zone offset
    pub date: DateTime<FixedOffset>,
    /// Summary line
    pub message: String,
    /// Lines attributed to this commit, in first-seen order
    pub lines: Vec<CommitLine>,
    /// Path recorded by the commit when the file was since renamed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_file_name: Option<String>,
    /// Short hash of the predecessor commit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_sha: Option<String>,
    /// Path of the file in the predecessor commit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_file_name: Option<String>,
    /// Whether git marked this as a boundary commit
    #[serde(default)]
    pub boundary: bool,
}

impl Commit {
    /// Copy of this commit carrying only the given lines.
    pub(crate) fn with_lines(&self, lines: Vec<CommitLine>) -> Self {
        Self {
            sha: self.sha.clone(),
            file_name: self.file_name.clone(),
            author: self.author.clone(),
            author_email: self.author_email.clone(),
            date: self.date,
            message: self.message.clone(),
            lines,
            original_file_name: self.original_file_name.clone(),
            previous_sha: self.previous_sha.clone(),
            previous_file_name: self.previous_file_name.clone(),
            boundary: self.boundary,
        }
    }

    /// Lines git has not attributed to any commit yet (working tree changes).
    pub fn is_uncommitted(&self) -> bool {
        !self.sha.is_empty() && self.sha.chars().all(|c| c == '0')
    }

    /// Path of the file as this commit knew it.
    pub fn path_in(&self, repo_root: &Path) -> PathBuf {
        repo_root.join(self.original_file_name.as_deref().unwrap_or(&self.file_name))
    }

    /// Path of the file in the predecessor commit.
    pub fn previous_path_in(&self, repo_root: &Path) -> PathBuf {
        match &self.previous_file_name {
            Some(previous) => repo_root.join(previous),
            None => self.path_in(repo_root),
        }
    }

    /// File name to open when jumping to this commit's version.
    pub fn display_file_name(&self) -> &str {
        self.original_file_name.as_deref().unwrap_or(&self.file_name)
    }
}

/// A parsed blame for one file.
///
/// Authors are ordered by descending line count and commits by descending
/// date. `lines` is indexed by current line number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blame {
    pub authors: Vec<Author>,
    pub commits: Vec<Commit>,
    pub lines: Vec<CommitLine>,
}

impl Blame {
    /// Find an author by name.
    pub fn author(&self, name: &str) -> Option<&Author> {
        self.authors.iter().find(|a| a.name == name)
    }

    /// Find a commit by full or short hash.
    pub fn commit(&self, sha: &str) -> Option<&Commit> {
        let sha = short_sha(sha);
        self.commits.iter().find(|c| c.sha == sha)
    }

    /// Number of lines in the blamed file.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A blame view, possibly restricted to a range, plus every line of the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlameLines {
    pub authors: Vec<Author>,
    pub commits: Vec<Commit>,
    pub lines: Vec<CommitLine>,
    pub all_lines: Vec<CommitLine>,
}

/// Blame of a single line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlameLine {
    /// Author, with `line_count` set to the lines of `commit`
    pub author: Author,
    pub commit: Commit,
    pub line: CommitLine,
}

/// One commit's lines within a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlameCommitLines {
    pub author: Author,
    pub commit: Commit,
    pub lines: Vec<CommitLine>,
}

/// An addressable location for a commit contributing to a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlameLocation {
    /// Position of the commit in date order (1-indexed)
    pub index: usize,
    /// Number of commits contributing to the range
    pub commit_count: usize,
    pub sha: String,
    /// File name as the commit knew it
    pub file_name: String,
    /// First line of the commit within the range
    pub line: CommitLine,
}
