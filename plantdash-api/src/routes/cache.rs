//! Cache Administration Routes
//!
//! - GET /api/v1/cache/stats - hit/miss counters and configured lifetimes
//! - POST /api/v1/cache/invalidate/:operation - evict one operation (admin)
//! - POST /api/v1/cache/invalidate - evict everything (admin)

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use plantdash_storage::CacheStats;
use serde::{Deserialize, Serialize};

use crate::cached_db::{CachedDashboard, CACHED_OPERATIONS};
use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::state::AppState;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub hit_rate: f64,
    pub operations: Vec<&'static str>,
    pub ttl_seconds: TtlSeconds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtlSeconds {
    pub filter: u64,
    pub summary: u64,
    pub panel: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidateResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    pub removed: u64,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /api/v1/cache/stats
pub async fn cache_stats(
    State(dashboard): State<CachedDashboard>,
) -> ApiResult<Json<CacheStatsResponse>> {
    let stats = dashboard.stats().await?;
    let ttls = dashboard.ttls();
    Ok(Json(CacheStatsResponse {
        hit_rate: stats.hit_rate(),
        stats,
        operations: CACHED_OPERATIONS.to_vec(),
        ttl_seconds: TtlSeconds {
            filter: ttls.filter.as_secs(),
            summary: ttls.summary.as_secs(),
            panel: ttls.panel.as_secs(),
        },
    }))
}

/// POST /api/v1/cache/invalidate/:operation
pub async fn invalidate_operation(
    State(dashboard): State<CachedDashboard>,
    current: CurrentUser,
    Path(operation): Path<String>,
) -> ApiResult<Json<InvalidateResponse>> {
    require_admin(&current)?;
    let removed = dashboard.invalidate(&operation).await?;
    tracing::info!(
        operation = %operation,
        removed,
        username = %current.session.user.username,
        "cache operation invalidated"
    );
    Ok(Json(InvalidateResponse {
        operation: Some(operation),
        removed,
    }))
}

/// POST /api/v1/cache/invalidate
pub async fn invalidate_all(
    State(dashboard): State<CachedDashboard>,
    current: CurrentUser,
) -> ApiResult<Json<InvalidateResponse>> {
    require_admin(&current)?;
    let removed = dashboard.invalidate_all().await?;
    tracing::info!(removed, username = %current.session.user.username, "cache cleared");
    Ok(Json(InvalidateResponse {
        operation: None,
        removed,
    }))
}

fn require_admin(current: &CurrentUser) -> ApiResult<()> {
    if current.session.user.is_admin() {
        Ok(())
    } else {
        Err(ApiError::forbidden("Cache invalidation requires the admin role"))
    }
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(cache_stats))
        .route("/invalidate", post(invalidate_all))
        .route("/invalidate/:operation", post(invalidate_operation))
}
