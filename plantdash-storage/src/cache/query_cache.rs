//! The query cache itself.

use plantdash_core::CacheError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::clock::{CacheClock, SystemClock};
use super::memory::InMemoryCacheStore;
use super::read::{age_between, CacheRead};
use super::traits::{CacheEntry, CacheKey, CacheStats, CacheStore};

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    refreshes: AtomicU64,
    refresh_failures: AtomicU64,
    invalidations: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Time-bounded memoization of named data-fetch operations.
///
/// Shared across all sessions. Cloning is cheap and clones share the same
/// store, clock and counters.
pub struct QueryCache<S = InMemoryCacheStore>
where
    S: CacheStore,
{
    store: Arc<S>,
    clock: Arc<dyn CacheClock>,
    counters: Arc<Counters>,
}

impl QueryCache<InMemoryCacheStore> {
    /// An in-memory cache on the system clock.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryCacheStore::new()), Arc::new(SystemClock))
    }
}

impl<S> QueryCache<S>
where
    S: CacheStore,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn CacheClock>) -> Self {
        Self {
            store,
            clock,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Return the cached value for `operation` if it is younger than `ttl`,
    /// otherwise run `fetch`, store its result, and return that.
    ///
    /// A failing `fetch` leaves any previous entry untouched and its error is
    /// returned as-is.
    pub async fn get_or_refresh<T, E, F, Fut>(
        &self,
        operation: &str,
        ttl: Duration,
        fetch: F,
    ) -> Result<CacheRead<T>, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = CacheKey::new(operation, ttl);
        let now = self.clock.now();

        if let Some(entry) = self.store.get(&key).await? {
            if age_between(entry.refreshed_at, now) < ttl {
                match serde_json::from_value::<T>(entry.value) {
                    Ok(value) => {
                        Counters::bump(&self.counters.hits);
                        tracing::trace!(%key, "cache hit");
                        return Ok(CacheRead::from_cache(value, entry.refreshed_at, now));
                    }
                    Err(e) => {
                        tracing::warn!(%key, error = %e, "cached value no longer decodes, refreshing");
                    }
                }
            }
        }

        Counters::bump(&self.counters.misses);
        tracing::debug!(%key, "cache miss, fetching");

        let value = match fetch().await {
            Ok(value) => value,
            Err(e) => {
                Counters::bump(&self.counters.refresh_failures);
                tracing::warn!(%key, "refresh failed, keeping previous entry");
                return Err(e);
            }
        };

        let encoded = serde_json::to_value(&value).map_err(|e| CacheError::Encode {
            operation: operation.to_string(),
            reason: e.to_string(),
        })?;
        let refreshed_at = self.clock.now();
        self.store
            .put(
                key,
                CacheEntry {
                    value: encoded,
                    refreshed_at,
                },
            )
            .await?;
        Counters::bump(&self.counters.refreshes);

        Ok(CacheRead::from_fetch(value, refreshed_at))
    }

    /// Read whatever is stored for `operation` under `ttl`, however old.
    pub async fn peek<T>(&self, operation: &str, ttl: Duration) -> Result<Option<CacheRead<T>>, CacheError>
    where
        T: DeserializeOwned,
    {
        let key = CacheKey::new(operation, ttl);
        let Some(entry) = self.store.get(&key).await? else {
            return Ok(None);
        };
        let value = serde_json::from_value::<T>(entry.value).map_err(|e| CacheError::Decode {
            operation: operation.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(CacheRead::from_cache(
            value,
            entry.refreshed_at,
            self.clock.now(),
        )))
    }

    /// Evict every cached window of `operation`. Returns the number removed.
    pub async fn invalidate(&self, operation: &str) -> Result<u64, CacheError> {
        let removed = self.store.remove_operation(operation).await?;
        self.counters
            .invalidations
            .fetch_add(removed, Ordering::Relaxed);
        tracing::info!(operation, removed, "cache invalidated");
        Ok(removed)
    }

    /// Evict everything.
    pub async fn invalidate_all(&self) -> Result<u64, CacheError> {
        let removed = self.store.clear().await?;
        self.counters
            .invalidations
            .fetch_add(removed, Ordering::Relaxed);
        tracing::info!(removed, "cache cleared");
        Ok(removed)
    }

    pub async fn stats(&self) -> Result<CacheStats, CacheError> {
        Ok(CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            refreshes: self.counters.refreshes.load(Ordering::Relaxed),
            refresh_failures: self.counters.refresh_failures.load(Ordering::Relaxed),
            invalidations: self.counters.invalidations.load(Ordering::Relaxed),
            entry_count: self.store.len().await?,
        })
    }
}

impl<S> Clone for QueryCache<S>
where
    S: CacheStore,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            counters: Arc::clone(&self.counters),
        }
    }
}
