//! Query cache with explicit time-to-live and invalidation.
//!
//! Entries are keyed by operation id and TTL window. A read younger than the
//! TTL is served from the store; a read at or past the TTL runs the fetch,
//! replaces the entry, and returns the fresh value. Reads come back wrapped in
//! [`CacheRead<T>`] so callers can see how old the data is.
//!
//! # Fetch failures
//!
//! When a refresh fails the previous entry is left exactly as it was and the
//! error goes back to the caller. Nothing is retried; the next read of the
//! same expired window runs the fetch again. [`QueryCache::peek`] still
//! returns the stale value in the meantime.
//!
//! # Example
//!
//! ```ignore
//! let cache = QueryCache::in_memory();
//! let summary = cache
//!     .get_or_refresh("plant_summary", Duration::from_secs(120), || async {
//!         db.plant_summary().await
//!     })
//!     .await?
//!     .into_value();
//! ```

pub mod clock;
pub mod memory;
pub mod query_cache;
pub mod read;
pub mod traits;

pub use clock::{CacheClock, ManualClock, SystemClock};
pub use memory::InMemoryCacheStore;
pub use query_cache::QueryCache;
pub use read::CacheRead;
pub use traits::{CacheEntry, CacheKey, CacheStats, CacheStore};
