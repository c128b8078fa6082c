//! Per-file blame cache with request coalescing.
//!
//! Each file maps to one shared future. Every caller asking for the same
//! file while the entry exists awaits that future, so a file is fetched and
//! parsed at most once per entry. Entries are only ever removed: by
//! [`BlameCache::evict`] or [`BlameCache::cancel`], or by the future itself
//! when the computation fails.

use crate::error::{Error, Result};
use crate::model::Blame;
use crate::parser::parse_porcelain;
use crate::path::{normalize_path, CacheKey};
use crate::source::BlameSource;
use futures::future::{abortable, AbortHandle, Aborted, BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// A pending or resolved blame computation, shared by all its callers.
pub type BlameFuture = Shared<BoxFuture<'static, Result<Arc<Blame>>>>;

struct Entry {
    /// Identifies the computation that created this entry.
    generation: u64,
    blame: BlameFuture,
    abort: AbortHandle,
}

type Entries = Arc<Mutex<HashMap<CacheKey, Entry>>>;

/// Lock the entry map. The map is consistent after every statement, so a
/// poisoned lock is still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cache of parsed blames keyed by normalized, case-insensitive path.
pub struct BlameCache {
    source: Arc<dyn BlameSource>,
    repo_root: PathBuf,
    entries: Entries,
    next_generation: AtomicU64,
}

impl BlameCache {
    /// Create an empty cache reading blames from `source`.
    pub fn new(source: Arc<dyn BlameSource>, repo_root: impl Into<PathBuf>) -> Self {
        Self {
            source,
            repo_root: repo_root.into(),
            entries: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Repository root that file names are resolved against.
    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// Cache key for a file name.
    pub fn key(&self, file_name: &str) -> CacheKey {
        CacheKey::new(file_name, &self.repo_root)
    }

    /// Blame for a file, shared with any other pending caller.
    ///
    /// The returned future is inserted before this call returns, so every
    /// later call made before an eviction receives a clone of it.
    pub fn get_blame(&self, file_name: &str) -> BlameFuture {
        let file_name = normalize_path(file_name, &self.repo_root);
        let key = CacheKey::from_normalized(&file_name);

        let mut entries = lock(&self.entries);
        if let Some(entry) = entries.get(&key) {
            debug!(file = %file_name, "Blame cache hit");
            return entry.blame.clone();
        }

        debug!(file = %file_name, "Blame cache miss");
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let (blame, abort) = self.compute(key.clone(), file_name, generation);
        entries.insert(
            key,
            Entry {
                generation,
                blame: blame.clone(),
                abort,
            },
        );
        blame
    }

    fn compute(
        &self,
        key: CacheKey,
        file_name: String,
        generation: u64,
    ) -> (BlameFuture, AbortHandle) {
        let source = Arc::clone(&self.source);
        let repo_root = self.repo_root.clone();
        let entries = Arc::clone(&self.entries);

        let fetch_name = file_name.clone();
        let (fetch, abort) =
            abortable(async move { source.blame_porcelain(&fetch_name, &repo_root).await });

        let blame = async move {
            let result = match fetch.await {
                Ok(fetched) => {
                    fetched.map(|data| Arc::new(parse_porcelain(&data, &file_name)))
                }
                Err(Aborted) => Err(Error::Cancelled),
            };

            if let Err(err) = &result {
                warn!(file = %file_name, error = %err, "Failed to blame file");
                // Only drop our own entry; a newer one may have replaced it.
                let mut entries = lock(&entries);
                if entries
                    .get(&key)
                    .is_some_and(|entry| entry.generation == generation)
                {
                    entries.remove(&key);
                }
            }

            result
        }
        .boxed()
        .shared();

        (blame, abort)
    }

    /// Remove a file's entry. Returns whether an entry was present.
    ///
    /// Callers already holding the old future still receive its result.
    pub fn evict(&self, file_name: &str) -> bool {
        self.evict_key(&self.key(file_name))
    }

    pub fn evict_key(&self, key: &CacheKey) -> bool {
        lock(&self.entries).remove(key).is_some()
    }

    /// Abort a file's pending fetch and remove its entry.
    ///
    /// Every caller awaiting the entry receives [`Error::Cancelled`]; the next
    /// request starts a new fetch. A resolved entry is simply evicted.
    pub fn cancel(&self, file_name: &str) -> bool {
        let key = self.key(file_name);
        let Some(entry) = lock(&self.entries).remove(&key) else {
            return false;
        };
        debug!(file = %key, "Cancelled blame fetch");
        entry.abort.abort();
        true
    }

    /// Whether a file currently has an entry (pending or resolved).
    pub fn contains(&self, file_name: &str) -> bool {
        lock(&self.entries).contains_key(&self.key(file_name))
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        lock(&self.entries).clear();
    }
}
