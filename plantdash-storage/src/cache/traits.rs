//! Cache store trait and the types it moves around.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use plantdash_core::CacheError;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Identity of a cached result: the operation and the TTL window it was
/// cached under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    operation: String,
    ttl: Duration,
}

impl CacheKey {
    pub fn new(operation: impl Into<String>, ttl: Duration) -> Self {
        Self {
            operation: operation.into(),
            ttl,
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}s", self.operation, self.ttl.as_secs())
    }
}

/// A stored value and the moment it was last refreshed.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub value: serde_json::Value,
    pub refreshed_at: DateTime<Utc>,
}

/// Pluggable storage for cache entries.
///
/// Implementations must be safe to share across sessions. A `put` replaces
/// the whole entry; concurrent writers to the same key resolve as last
/// writer wins.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError>;

    async fn put(&self, key: CacheKey, entry: CacheEntry) -> Result<(), CacheError>;

    /// Remove every TTL window cached for `operation`.
    async fn remove_operation(&self, operation: &str) -> Result<u64, CacheError>;

    /// Remove everything.
    async fn clear(&self) -> Result<u64, CacheError>;

    async fn len(&self) -> Result<u64, CacheError>;

    async fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.len().await? == 0)
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Reads served from the store.
    pub hits: u64,
    /// Reads that had to fetch.
    pub misses: u64,
    /// Successful fetches stored.
    pub refreshes: u64,
    /// Fetches that returned an error.
    pub refresh_failures: u64,
    /// Entries removed through invalidation.
    pub invalidations: u64,
    /// Entries currently held.
    pub entry_count: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_identity_includes_ttl() {
        let a = CacheKey::new("plant_summary", Duration::from_secs(120));
        let b = CacheKey::new("plant_summary", Duration::from_secs(900));
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "plant_summary@120s");
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
