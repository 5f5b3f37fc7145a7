//! Coalescing query cache.
//!
//! Each [`CacheKey`] maps to one shared load. The first caller for a key
//! starts the load; every later or concurrent caller awaits the same shared
//! future, so the store sees at most one query per key. Dropping one waiter
//! does not cancel the load for the others, and a load abandoned by every
//! waiter resumes when the key is next requested. Failed loads are handed to
//! all current waiters and then evicted so that a later request retries.

use std::{
    any::Any,
    collections::HashMap,
    fmt,
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use futures_util::future::{BoxFuture, FutureExt, Shared, TryFutureExt};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    error::{ContentError, Result},
    key::CacheKey,
};

type CachedValue = Arc<dyn Any + Send + Sync>;
type SharedLoad = Shared<BoxFuture<'static, Result<CachedValue>>>;

/// Hit and miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Cache of pending and resolved loads, scoped to one build or server process.
///
/// Cloning is cheap and clones share entries.
#[derive(Clone, Default)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    entries: Mutex<HashMap<CacheKey, SharedLoad>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl QueryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `key`, running `load` only if no load for it exists yet.
    ///
    /// `V` must be the same type for every use of a key; a mismatch is
    /// reported as [`ContentError::CacheConflict`].
    pub async fn get_or_load<V, F, Fut>(&self, key: CacheKey, load: F) -> Result<V>
    where
        V: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let shared = {
            let mut entries = self.inner.entries.lock().await;
            match entries.get(&key) {
                Some(existing) => {
                    self.inner.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(key = %key, "cache hit");
                    existing.clone()
                }
                None => {
                    self.inner.misses.fetch_add(1, Ordering::Relaxed);
                    debug!(key = %key, "cache miss");
                    let pending = load().map_ok(|value| Arc::new(value) as CachedValue);
                    let shared = pending.boxed().shared();
                    entries.insert(key.clone(), shared.clone());
                    shared
                }
            }
        };

        match shared.clone().await {
            Ok(value) => value
                .downcast_ref::<V>()
                .cloned()
                .ok_or_else(|| ContentError::CacheConflict(key.to_string())),
            Err(err) => {
                self.evict_failed(&key, &shared).await;
                Err(err)
            }
        }
    }

    /// Drop the entry for `key` if it is still the failed load.
    async fn evict_failed(&self, key: &CacheKey, failed: &SharedLoad) {
        let mut entries = self.inner.entries.lock().await;
        let stale = entries.get(key).is_some_and(|entry| entry.ptr_eq(failed));
        if stale {
            entries.remove(key);
            warn!(key = %key, "evicted failed load");
        }
    }

    /// Whether `key` has a pending or resolved entry.
    pub async fn contains(&self, key: &CacheKey) -> bool {
        self.inner.entries.lock().await.contains_key(key)
    }

    /// Forget one entry. Waiters already holding it still receive its result.
    pub async fn invalidate(&self, key: &CacheKey) -> bool {
        self.inner.entries.lock().await.remove(key).is_some()
    }

    /// Forget every entry.
    pub async fn clear(&self) {
        self.inner.entries.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
        }
    }
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
