//! BlameLens Core Library
//!
//! Parses porcelain blame output into a queryable model, slices it by line
//! range and commit, and caches it per file with change-driven invalidation.

pub mod cache;
pub mod config;
pub mod error;
pub mod invalidator;
pub mod model;
pub mod parser;
pub mod path;
pub mod query;
pub mod service;
pub mod source;

#[cfg(test)]
pub mod testutils;

pub use cache::{BlameCache, BlameFuture};
pub use config::BlameConfig;
pub use error::{Error, Result};
pub use invalidator::Invalidator;
pub use model::{
    short_sha, Author, Blame, BlameCommitLines, BlameLine, BlameLines, BlameLocation, Commit,
    CommitLine, LineRange,
};
pub use parser::parse_porcelain;
pub use path::{normalize_path, CacheKey};
pub use service::BlameService;
pub use source::BlameSource;
