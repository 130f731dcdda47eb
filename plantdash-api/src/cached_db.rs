//! Cached Dashboard Client
//!
//! `CachedDashboard` puts the shared [`QueryCache`] in front of a
//! [`DashboardSource`]. Panels call it for every read; each cached operation
//! fetches raw rows, shapes them into a view model, and stores the view
//! model under the operation id with the configured TTL.

use plantdash_core::{
    build_filter_options, build_plant_summary, rename_columns, CellValue, DisplayTable,
    FilterOptionSet, PlantFilterOptions, PlantSearchFilter,
};
use plantdash_storage::{CacheRead, CacheStats, QueryCache};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheTtls;
use crate::error::{ApiError, ApiResult};
use crate::queries::TableQuery;
use crate::source::DashboardSource;
use crate::telemetry::{CacheOutcome, METRICS};

/// Cache id of the four dropdown option lists, loaded and cached together.
pub const FILTER_OPTIONS_OPERATION: &str = "filter_options";

/// Every operation id that can hold a cache entry.
pub const CACHED_OPERATIONS: [&str; 6] = [
    FILTER_OPTIONS_OPERATION,
    "plant_summary",
    "call_directory",
    "all_plants",
    "sales_activity",
    "outages",
];

/// Data client with transparent query caching.
#[derive(Clone)]
pub struct CachedDashboard {
    source: Arc<dyn DashboardSource>,
    cache: QueryCache,
    ttls: CacheTtls,
}

impl CachedDashboard {
    pub fn new(source: Arc<dyn DashboardSource>, cache: QueryCache, ttls: CacheTtls) -> Self {
        Self {
            source,
            cache,
            ttls,
        }
    }

    pub fn source(&self) -> &dyn DashboardSource {
        self.source.as_ref()
    }

    pub fn ttls(&self) -> CacheTtls {
        self.ttls
    }

    /// The four dropdown option lists for plant search.
    pub async fn filter_options(&self) -> ApiResult<CacheRead<PlantFilterOptions>> {
        self.cached(FILTER_OPTIONS_OPERATION, self.ttls.filter, || async {
            let (plants, fuels, manufacturers, drive_types) = tokio::try_join!(
                self.option_set(TableQuery::PlantNames),
                self.option_set(TableQuery::FuelTypes),
                self.option_set(TableQuery::DriveManufacturers),
                self.option_set(TableQuery::DriveTypes),
            )?;
            Ok(PlantFilterOptions {
                plants,
                fuels,
                manufacturers,
                drive_types,
            })
        })
        .await
    }

    /// Plants with at least one contact and one drive, display-ready.
    pub async fn plant_summary(&self) -> ApiResult<CacheRead<DisplayTable>> {
        let query = TableQuery::PlantSummary;
        self.cached(query.operation_id(), self.ttls.summary, || async {
            let raw = self.source.load_table(query).await?;
            Ok(build_plant_summary(&raw)?)
        })
        .await
    }

    /// A panel table: `query` renamed with `mapping`, cached for the panel TTL.
    pub async fn panel_table(
        &self,
        query: TableQuery,
        mapping: &[(&str, &str)],
    ) -> ApiResult<CacheRead<DisplayTable>> {
        self.cached(query.operation_id(), self.ttls.panel, || async {
            let raw = self.source.load_table(query).await?;
            Ok(rename_columns(&raw, mapping))
        })
        .await
    }

    /// Plant ids matching the drive selections of `filter`. Not cached: the
    /// result depends on the selection.
    pub async fn drive_matches(&self, filter: &PlantSearchFilter) -> ApiResult<Vec<CellValue>> {
        let raw = self
            .source
            .drive_matches(filter.manufacturer(), filter.drive_type())
            .await?;
        let ids = raw.column("plant_id")?.cloned().collect();
        Ok(ids)
    }

    /// Evict one cached operation. Unknown ids are rejected.
    pub async fn invalidate(&self, operation: &str) -> ApiResult<u64> {
        if !CACHED_OPERATIONS.contains(&operation) {
            return Err(ApiError::not_found(format!(
                "Unknown cache operation '{}'",
                operation
            ))
            .with_details(serde_json::json!({ "operations": CACHED_OPERATIONS })));
        }
        Ok(self.cache.invalidate(operation).await?)
    }

    pub async fn invalidate_all(&self) -> ApiResult<u64> {
        Ok(self.cache.invalidate_all().await?)
    }

    pub async fn stats(&self) -> ApiResult<CacheStats> {
        Ok(self.cache.stats().await?)
    }

    async fn option_set(&self, query: TableQuery) -> ApiResult<FilterOptionSet> {
        let column = query.option_column().ok_or_else(|| {
            ApiError::internal_error(format!("{} is not an option query", query.operation_id()))
        })?;
        let raw = self.source.load_table(query).await?;
        Ok(build_filter_options(&raw, column)?)
    }

    async fn cached<T, F, Fut>(
        &self,
        operation: &str,
        ttl: Duration,
        fetch: F,
    ) -> ApiResult<CacheRead<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let result = self.cache.get_or_refresh(operation, ttl, fetch).await;

        let outcome = match &result {
            Ok(read) if read.was_cache_hit() => CacheOutcome::Hit,
            Ok(_) => CacheOutcome::Miss,
            Err(_) => CacheOutcome::Error,
        };
        if let Ok(metrics) = METRICS.as_ref() {
            metrics.record_cache_read(operation, outcome);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use plantdash_core::RawTable;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use crate::source::StoredUser;

    #[derive(Default)]
    struct CountingSource {
        loads: AtomicUsize,
        fail: AtomicBool,
    }

    #[async_trait]
    impl DashboardSource for CountingSource {
        async fn load_table(&self, query: TableQuery) -> ApiResult<RawTable> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(ApiError::database_error("connection reset"));
            }
            let column = query.option_column().unwrap_or("plantname");
            Ok(RawTable::with_rows(
                [column],
                vec![vec![CellValue::from("Alpha")], vec![CellValue::Null]],
            )?)
        }

        async fn drive_matches(
            &self,
            _manufacturer: Option<&str>,
            _drive_type: Option<&str>,
        ) -> ApiResult<RawTable> {
            Ok(RawTable::with_rows(["plant_id"], vec![vec![CellValue::Int(7)]])?)
        }

        async fn find_user(&self, _username: &str) -> ApiResult<Option<StoredUser>> {
            Ok(None)
        }

        async fn health_check(&self) -> ApiResult<()> {
            Ok(())
        }
    }

    fn dashboard(source: Arc<CountingSource>) -> CachedDashboard {
        CachedDashboard::new(source, QueryCache::in_memory(), CacheTtls::default())
    }

    #[tokio::test]
    async fn test_filter_options_cached_as_one_operation() -> ApiResult<()> {
        let source = Arc::new(CountingSource::default());
        let dash = dashboard(source.clone());

        let first = dash.filter_options().await?;
        assert!(first.was_cache_miss());
        assert_eq!(first.value().fuels.as_slice(), ["All", "Alpha"]);
        assert_eq!(source.loads.load(Ordering::SeqCst), 4);

        let second = dash.filter_options().await?;
        assert!(second.was_cache_hit());
        assert_eq!(source.loads.load(Ordering::SeqCst), 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_refresh_is_not_cached() {
        let source = Arc::new(CountingSource::default());
        source.fail.store(true, Ordering::SeqCst);
        let dash = dashboard(source.clone());

        assert!(dash.filter_options().await.is_err());
        assert!(dash.filter_options().await.is_err());
        assert_eq!(dash.stats().await.map(|s| s.entry_count).ok(), Some(0));
    }

    #[tokio::test]
    async fn test_panel_table_renames_columns() -> ApiResult<()> {
        let source = Arc::new(CountingSource::default());
        let dash = dashboard(source);

        let read = dash
            .panel_table(TableQuery::AllPlants, &[("plantname", "Plant Name")])
            .await?;
        assert_eq!(read.value().columns(), ["Plant Name"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalidate_rejects_unknown_operation() {
        let dash = dashboard(Arc::new(CountingSource::default()));
        let err = dash.invalidate("reports").await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::EntityNotFound);
        let known = err.details.as_ref().map(|d| d["operations"].clone());
        assert_eq!(known, Some(serde_json::json!(CACHED_OPERATIONS)));
        assert_eq!(dash.invalidate("outages").await.ok(), Some(0));
    }

    #[tokio::test]
    async fn test_drive_matches_returns_plant_ids() -> ApiResult<()> {
        let dash = dashboard(Arc::new(CountingSource::default()));
        let filter = PlantSearchFilter {
            manufacturer: Some("ABB".to_string()),
            ..Default::default()
        };
        assert_eq!(dash.drive_matches(&filter).await?, vec![CellValue::Int(7)]);
        Ok(())
    }
}
