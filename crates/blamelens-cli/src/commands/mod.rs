//! Command implementations and shared helpers.

pub mod authors;
pub mod blame;
pub mod commit;
pub mod line;
pub mod locations;

use anyhow::Result;
use blamelens_core::{BlameConfig, BlameService, Commit, LineRange};
use blamelens_git::{GitBlameSource, GitRepository};
use chrono::{DateTime, FixedOffset, Local};
use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Default configuration file, relative to the repository root.
pub const CONFIG_FILE: &str = ".blamelens.json";

/// Repository, blame service and output mode shared by every command.
pub struct Context {
    pub repo: GitRepository,
    pub service: BlameService,
    pub json: bool,
}

impl Context {
    pub fn open(repo_path: &Path, config_path: Option<&Path>, json: bool) -> Result<Self> {
        let repo = GitRepository::discover(repo_path)?;
        let config = match config_path {
            Some(path) => BlameConfig::load(path)?,
            None => BlameConfig::load(repo.root().join(CONFIG_FILE))?,
        };
        tracing::debug!(root = %repo.root().display(), ?config, "Opened repository");

        let source = Arc::new(GitBlameSource::from_config(&config));
        let service = BlameService::new(source, repo.root(), &config);
        Ok(Self { repo, service, json })
    }

    /// Resolve a command-line path to a tracked, root-relative file name.
    ///
    /// Prints a message and returns `None` for untracked files.
    pub fn tracked_file(&self, file: &Path) -> Result<Option<String>> {
        let absolute = if file.is_absolute() {
            file.to_path_buf()
        } else {
            std::env::current_dir()?.join(file)
        };

        if !self.repo.is_tracked(&absolute)? {
            eprintln!("{} Not under version control: {}", "✗".red(), file.display());
            return Ok(None);
        }
        Ok(Some(self.repo.relative_path(&absolute)))
    }
}

/// Parse a 1-indexed line number into a 0-indexed one.
pub fn parse_line(s: &str) -> std::result::Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("line numbers start at 1".to_string()),
        Ok(n) => Ok(n - 1),
        Err(e) => Err(format!("invalid line number '{}': {}", s, e)),
    }
}

/// Parse `START:END` (1-indexed, inclusive) or a single line.
pub fn parse_lines(s: &str) -> std::result::Result<LineRange, String> {
    let Some((start, end)) = s.split_once(':') else {
        return parse_line(s).map(LineRange::line);
    };
    let start = parse_line(start)?;
    let end = parse_line(end)?;
    if end < start {
        return Err(format!("range '{}' ends before it starts", s));
    }
    Ok(LineRange::new(start, end))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Commit date in the local time zone, to the minute.
pub fn format_date(date: &DateTime<FixedOffset>) -> String {
    date.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// `abcdef01 Alice 2024-01-31 12:00`
pub fn commit_label(commit: &Commit) -> String {
    format!(
        "{} {} {}",
        commit.sha.yellow(),
        commit.author.cyan(),
        format_date(&commit.date)
    )
}
