//! Range and commit queries over a parsed [`Blame`].
//!
//! Every query derives a new view; the source blame is never modified.

use crate::model::{
    short_sha, Author, Blame, BlameCommitLines, BlameLine, BlameLines, BlameLocation, Commit,
    CommitLine, LineRange,
};
use std::collections::{HashMap, HashSet};

impl Blame {
    /// The whole file, shaped like a range query.
    pub fn for_file(&self) -> BlameLines {
        BlameLines {
            authors: self.authors.clone(),
            commits: self.commits.clone(),
            lines: self.lines.clone(),
            all_lines: self.lines.clone(),
        }
    }

    /// Blame restricted to `range`.
    ///
    /// Commits keep the date order of the full blame and carry only their
    /// lines inside the range; authors are re-counted from those lines.
    pub fn for_range(&self, range: LineRange) -> BlameLines {
        if self.is_empty() || (range.start == 0 && range.end >= self.line_count() - 1) {
            return self.for_file();
        }

        let lines = self.slice(range).to_vec();
        let shas: HashSet<&str> = lines.iter().map(|l| l.sha.as_str()).collect();

        let commits: Vec<Commit> = self
            .commits
            .iter()
            .filter(|c| shas.contains(c.sha.as_str()))
            .map(|c| {
                c.with_lines(
                    c.lines
                        .iter()
                        .filter(|l| range.contains(l.line))
                        .cloned()
                        .collect(),
                )
            })
            .collect();

        BlameLines {
            authors: rank_authors(&commits),
            commits,
            lines,
            all_lines: self.lines.clone(),
        }
    }

    /// Lines of one commit within `range`.
    ///
    /// Returns `None` when the commit does not appear in the file.
    pub fn for_sha_and_range(&self, sha: &str, range: LineRange) -> Option<BlameCommitLines> {
        let commit = self.commit(sha)?;
        let lines: Vec<CommitLine> = self
            .slice(range)
            .iter()
            .filter(|l| l.sha == commit.sha)
            .cloned()
            .collect();

        Some(BlameCommitLines {
            author: Author {
                name: commit.author.clone(),
                line_count: lines.len(),
            },
            commit: commit.with_lines(lines.clone()),
            lines,
        })
    }

    /// Blame of a single line.
    ///
    /// The author's `line_count` is the number of lines its commit
    /// contributes to the file.
    pub fn for_line(&self, line: usize) -> Option<BlameLine> {
        let blame_line = self.lines.get(line)?;
        let commit = self.commit(&blame_line.sha)?;

        Some(BlameLine {
            author: Author {
                name: commit.author.clone(),
                line_count: commit.lines.len(),
            },
            commit: commit.clone(),
            line: blame_line.clone(),
        })
    }

    /// `lines[range.start..=range.end]`, clamped to the file.
    fn slice(&self, range: LineRange) -> &[CommitLine] {
        if range.start > range.end || range.start >= self.line_count() {
            return &[];
        }
        let end = range.end.min(self.line_count() - 1);
        &self.lines[range.start..=end]
    }
}

impl BlameLines {
    /// One location per contributing commit, newest first, at the commit's
    /// first line in the view.
    pub fn locations(&self) -> Vec<BlameLocation> {
        let contributing: Vec<&Commit> =
            self.commits.iter().filter(|c| !c.lines.is_empty()).collect();
        let commit_count = contributing.len();

        contributing
            .into_iter()
            .enumerate()
            .filter_map(|(i, c)| {
                let line = c.lines.iter().min_by_key(|l| l.line)?;
                Some(BlameLocation {
                    index: i + 1,
                    commit_count,
                    sha: c.sha.clone(),
                    file_name: c.display_file_name().to_string(),
                    line: line.clone(),
                })
            })
            .collect()
    }

    /// Find a commit in this view by full or short hash.
    pub fn commit(&self, sha: &str) -> Option<&Commit> {
        let sha = short_sha(sha);
        self.commits.iter().find(|c| c.sha == sha)
    }
}

/// Authors of `commits` ranked by descending line count; ties keep the order
/// in which authors were first met.
fn rank_authors(commits: &[Commit]) -> Vec<Author> {
    let mut authors: Vec<Author> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for commit in commits {
        let i = *index.entry(commit.author.as_str()).or_insert_with(|| {
            authors.push(Author::new(commit.author.as_str()));
            authors.len() - 1
        });
        authors[i].line_count += commit.lines.len();
    }

    authors.sort_by(|a, b| b.line_count.cmp(&a.line_count));
    authors
}
