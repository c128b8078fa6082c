//! Blame query API over the cache, plus file lifecycle hooks.

use crate::cache::BlameCache;
use crate::config::BlameConfig;
use crate::error::Result;
use crate::invalidator::Invalidator;
use crate::model::{Blame, BlameCommitLines, BlameLine, BlameLines, BlameLocation, LineRange};
use crate::source::BlameSource;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Cached blame queries for the files of one repository.
///
/// All queries for a file await the same cached computation.
pub struct BlameService {
    cache: Arc<BlameCache>,
    invalidator: Invalidator,
}

impl BlameService {
    pub fn new(
        source: Arc<dyn BlameSource>,
        repo_root: impl Into<PathBuf>,
        config: &BlameConfig,
    ) -> Self {
        let cache = Arc::new(BlameCache::new(source, repo_root));
        let invalidator = Invalidator::new(Arc::clone(&cache), config.debounce());
        Self { cache, invalidator }
    }

    pub fn repo_root(&self) -> &Path {
        self.cache.repo_root()
    }

    pub fn cache(&self) -> &Arc<BlameCache> {
        &self.cache
    }

    pub fn invalidator(&self) -> &Invalidator {
        &self.invalidator
    }

    /// Full blame of a file.
    pub async fn get_blame_for_file(&self, file_name: &str) -> Result<Arc<Blame>> {
        self.cache.get_blame(file_name).await
    }

    /// Blame of one line; `None` past the end of the file.
    pub async fn get_blame_for_line(&self, file_name: &str, line: usize) -> Result<Option<BlameLine>> {
        Ok(self.get_blame_for_file(file_name).await?.for_line(line))
    }

    pub async fn get_blame_for_range(&self, file_name: &str, range: LineRange) -> Result<BlameLines> {
        Ok(self.get_blame_for_file(file_name).await?.for_range(range))
    }

    /// Lines of one commit within a range; `None` if the commit is not in the file.
    pub async fn get_blame_for_sha_range(
        &self,
        file_name: &str,
        sha: &str,
        range: LineRange,
    ) -> Result<Option<BlameCommitLines>> {
        Ok(self
            .get_blame_for_file(file_name)
            .await?
            .for_sha_and_range(sha, range))
    }

    /// One location per commit touching the range, newest first.
    pub async fn get_blame_locations(
        &self,
        file_name: &str,
        range: LineRange,
    ) -> Result<Vec<BlameLocation>> {
        Ok(self.get_blame_for_range(file_name, range).await?.locations())
    }

    pub fn on_edit(&self, file_name: &str) {
        self.invalidator.on_edit(file_name);
    }

    pub fn on_save(&self, file_name: &str) {
        self.invalidator.on_save(file_name);
    }

    pub fn on_close(&self, file_name: &str) {
        self.invalidator.on_close(file_name);
    }

    /// Abort a pending fetch; its waiters fail with `Error::Cancelled`.
    pub fn cancel(&self, file_name: &str) -> bool {
        self.cache.cancel(file_name)
    }

    /// Drop all cached blames and pending evictions.
    pub fn dispose(&self) {
        self.invalidator.clear_all();
    }
}
