//! Evicts cached blames when files change.
//!
//! Edits and saves are hard resets: they arm a per-file deadline, and every
//! further reset of the same file pushes that deadline back. The entry is
//! evicted once the deadline passes with no newer event. Closing a file is a
//! soft clear that evicts at once and disarms any pending deadline.
//!
//! Nothing here repopulates the cache; the next query refetches lazily.

use crate::cache::BlameCache;
use crate::path::CacheKey;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Pending eviction of one file. `timer` identifies the task waiting on it.
#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    timer: u64,
}

type Deadlines = Arc<Mutex<HashMap<CacheKey, Deadline>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Debounced cache invalidation driven by file lifecycle events.
pub struct Invalidator {
    cache: Arc<BlameCache>,
    debounce: Duration,
    deadlines: Deadlines,
    next_timer: AtomicU64,
}

impl Invalidator {
    pub fn new(cache: Arc<BlameCache>, debounce: Duration) -> Self {
        Self {
            cache,
            debounce,
            deadlines: Arc::new(Mutex::new(HashMap::new())),
            next_timer: AtomicU64::new(0),
        }
    }

    /// The file was edited.
    pub fn on_edit(&self, file_name: &str) {
        self.reset(file_name);
    }

    /// The file was saved.
    pub fn on_save(&self, file_name: &str) {
        self.reset(file_name);
    }

    /// The file was closed.
    pub fn on_close(&self, file_name: &str) {
        self.clear(file_name);
    }

    /// Arm (or push back) the eviction deadline for a changed file.
    ///
    /// Each file has at most one timer task. A reset while it sleeps only
    /// moves the deadline; the task goes back to sleep when it wakes early.
    /// Outside a Tokio runtime there is no timer to wait on, so the entry is
    /// evicted immediately.
    pub fn reset(&self, file_name: &str) {
        let key = self.cache.key(file_name);

        let Ok(handle) = Handle::try_current() else {
            warn!(file = %key, "No runtime for debounced eviction, evicting now");
            self.evict(&key, true);
            return;
        };

        let at = Instant::now() + self.debounce;
        let timer = {
            let mut deadlines = lock(&self.deadlines);
            if let Some(deadline) = deadlines.get_mut(&key) {
                deadline.at = at;
                return;
            }
            let timer = self.next_timer.fetch_add(1, Ordering::SeqCst);
            deadlines.insert(key.clone(), Deadline { at, timer });
            timer
        };

        let cache = Arc::clone(&self.cache);
        let deadlines = Arc::clone(&self.deadlines);
        handle.spawn(async move {
            let mut wake_at = at;
            loop {
                tokio::time::sleep_until(wake_at).await;

                let expired = {
                    let mut pending = lock(&deadlines);
                    match pending.get(&key).copied() {
                        Some(deadline) if deadline.timer == timer => {
                            if deadline.at > wake_at {
                                wake_at = deadline.at;
                                false
                            } else {
                                pending.remove(&key);
                                true
                            }
                        }
                        // Disarmed, possibly re-armed under a newer timer.
                        _ => return,
                    }
                };

                if expired {
                    if cache.evict_key(&key) {
                        debug!(file = %key, reset = true, "Cleared blame");
                    }
                    return;
                }
            }
        });
    }

    /// Evict a file's entry now and disarm its deadline.
    pub fn clear(&self, file_name: &str) {
        let key = self.cache.key(file_name);
        lock(&self.deadlines).remove(&key);
        self.evict(&key, false);
    }

    /// Number of files waiting for a debounced eviction.
    pub fn pending(&self) -> usize {
        lock(&self.deadlines).len()
    }

    /// Disarm every deadline and empty the cache.
    pub fn clear_all(&self) {
        lock(&self.deadlines).clear();
        self.cache.clear();
    }

    fn evict(&self, key: &CacheKey, reset: bool) {
        if self.cache.evict_key(key) {
            debug!(file = %key, reset, "Cleared blame");
        }
    }
}
