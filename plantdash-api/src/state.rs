//! Shared application state for Axum routers.

use plantdash_storage::QueryCache;
use std::sync::Arc;
use std::time::Instant;

use crate::auth::SessionStore;
use crate::cached_db::CachedDashboard;
use crate::config::ApiConfig;
use crate::source::DashboardSource;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Cached data client used by every panel.
    pub dashboard: CachedDashboard,
    /// Live login sessions.
    pub sessions: SessionStore,
    pub start_time: Instant,
}

impl AppState {
    /// Build state around `source` with a fresh in-memory query cache.
    pub fn new(source: Arc<dyn DashboardSource>, config: &ApiConfig) -> Self {
        Self::with_cache(source, QueryCache::in_memory(), config)
    }

    pub fn with_cache(
        source: Arc<dyn DashboardSource>,
        cache: QueryCache,
        config: &ApiConfig,
    ) -> Self {
        Self {
            dashboard: CachedDashboard::new(source, cache, config.cache_ttls),
            sessions: SessionStore::new(config.session_ttl),
            start_time: Instant::now(),
        }
    }
}

crate::impl_from_ref!(CachedDashboard, dashboard);
crate::impl_from_ref!(SessionStore, sessions);
crate::impl_from_ref!(Instant, start_time);
