//! PLANTDASH Storage - Query Result Caching
//!
//! Every dashboard panel follows the same pattern: run a query, keep the
//! shaped result for a while, serve it to every session until it expires.
//! This crate owns the "keep it for a while" part.

pub mod cache;

pub use cache::{
    CacheClock, CacheEntry, CacheKey, CacheRead, CacheStats, CacheStore, InMemoryCacheStore,
    ManualClock, QueryCache, SystemClock,
};
