//! Cache read results carrying age metadata.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Result of a cache read.
///
/// Wraps the value together with when it was last refreshed and whether it
/// came from the store or from a fresh fetch.
#[derive(Debug, Clone)]
pub struct CacheRead<T> {
    value: T,
    refreshed_at: DateTime<Utc>,
    age: Duration,
    was_cache_hit: bool,
}

impl<T> CacheRead<T> {
    /// A value served from the store.
    pub fn from_cache(value: T, refreshed_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self {
            value,
            refreshed_at,
            age: age_between(refreshed_at, now),
            was_cache_hit: true,
        }
    }

    /// A value that was just fetched.
    pub fn from_fetch(value: T, refreshed_at: DateTime<Utc>) -> Self {
        Self {
            value,
            refreshed_at,
            age: Duration::ZERO,
            was_cache_hit: false,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn refreshed_at(&self) -> DateTime<Utc> {
        self.refreshed_at
    }

    /// Age of the value at the time it was read.
    pub fn age(&self) -> Duration {
        self.age
    }

    pub fn was_cache_hit(&self) -> bool {
        self.was_cache_hit
    }

    pub fn was_cache_miss(&self) -> bool {
        !self.was_cache_hit
    }

    /// Transform the value, keeping the metadata.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> CacheRead<U> {
        CacheRead {
            value: f(self.value),
            refreshed_at: self.refreshed_at,
            age: self.age,
            was_cache_hit: self.was_cache_hit,
        }
    }
}

/// Elapsed time from `earlier` to `now`, clamped at zero.
pub(crate) fn age_between(earlier: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    now.signed_duration_since(earlier)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cache_computes_age() {
        let refreshed = Utc::now();
        let now = refreshed + chrono::Duration::seconds(42);
        let read = CacheRead::from_cache("rows", refreshed, now);

        assert!(read.was_cache_hit());
        assert_eq!(read.age(), Duration::from_secs(42));
        assert_eq!(read.refreshed_at(), refreshed);
    }

    #[test]
    fn test_age_clamps_when_clock_goes_backwards() {
        let refreshed = Utc::now();
        let now = refreshed - chrono::Duration::seconds(5);
        assert_eq!(age_between(refreshed, now), Duration::ZERO);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let read = CacheRead::from_fetch(vec![1, 2, 3], Utc::now());
        let mapped = read.map(|v| v.len());
        assert!(mapped.was_cache_miss());
        assert_eq!(mapped.into_value(), 3);
    }
}
