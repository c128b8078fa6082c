//! BlameLens Git Integration
//!
//! Locates repositories and produces porcelain blame text by running git.

pub mod blame;
pub mod repository;

pub use blame::GitBlameSource;
pub use repository::{GitError, GitRepository};
