//! In-process cache store.

use async_trait::async_trait;
use plantdash_core::CacheError;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::traits::{CacheEntry, CacheKey, CacheStore};

/// Cache store backed by a `HashMap` behind an async `RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: CacheKey, entry: CacheEntry) -> Result<(), CacheError> {
        self.entries.write().await.insert(key, entry);
        Ok(())
    }

    async fn remove_operation(&self, operation: &str) -> Result<u64, CacheError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| key.operation() != operation);
        Ok((before - entries.len()) as u64)
    }

    async fn clear(&self) -> Result<u64, CacheError> {
        let mut entries = self.entries.write().await;
        let removed = entries.len() as u64;
        entries.clear();
        Ok(removed)
    }

    async fn len(&self) -> Result<u64, CacheError> {
        Ok(self.entries.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;

    fn entry(value: serde_json::Value) -> CacheEntry {
        CacheEntry {
            value,
            refreshed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_put_replaces_entry() {
        let store = InMemoryCacheStore::new();
        let key = CacheKey::new("fuel_options", Duration::from_secs(900));

        store.put(key.clone(), entry(serde_json::json!(["All"]))).await.unwrap();
        store
            .put(key.clone(), entry(serde_json::json!(["All", "Coal"])))
            .await
            .unwrap();

        let got = store.get(&key).await.unwrap().unwrap();
        assert_eq!(got.value, serde_json::json!(["All", "Coal"]));
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_remove_operation_drops_all_ttl_windows() {
        let store = InMemoryCacheStore::new();
        for secs in [60, 120] {
            store
                .put(
                    CacheKey::new("plant_summary", Duration::from_secs(secs)),
                    entry(serde_json::json!(secs)),
                )
                .await
                .unwrap();
        }
        store
            .put(
                CacheKey::new("outages", Duration::from_secs(60)),
                entry(serde_json::json!(null)),
            )
            .await
            .unwrap();

        assert_eq!(store.remove_operation("plant_summary").await.unwrap(), 2);
        assert_eq!(store.len().await.unwrap(), 1);
        assert_eq!(store.clear().await.unwrap(), 1);
        assert!(store.is_empty().await.unwrap());
    }
}
