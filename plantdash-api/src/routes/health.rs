//! Health Check Endpoints
//!
//! - /health/ping - plain-text liveness
//! - /health/live - process is up
//! - /health/ready - database reachable and query cache readable, with
//!   cache and session counts
//!
//! No login required.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::auth::SessionStore;
use crate::cached_db::CachedDashboard;
use crate::state::AppState;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ReadinessDetails>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    fn from_ok(ok: bool) -> Self {
        if ok {
            Self::Healthy
        } else {
            Self::Unhealthy
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessDetails {
    pub database: DatabaseHealth,
    pub cache: CacheHealth,
    /// Sessions currently held, including any not yet purged after expiry.
    pub active_sessions: usize,
    pub version: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheHealth {
    pub status: HealthStatus,
    pub entries: u64,
    pub hit_rate: f64,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /health/ping
pub async fn ping() -> &'static str {
    "pong"
}

/// GET /health/live
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HealthStatus::Healthy,
        details: None,
    })
}

/// GET /health/ready
///
/// 503 when the database check fails or cache statistics cannot be read.
pub async fn readiness(
    State(dashboard): State<CachedDashboard>,
    State(sessions): State<SessionStore>,
    State(start_time): State<Instant>,
) -> impl IntoResponse {
    let database = check_database(&dashboard).await;
    let cache = match dashboard.stats().await {
        Ok(stats) => CacheHealth {
            status: HealthStatus::Healthy,
            entries: stats.entry_count,
            hit_rate: stats.hit_rate(),
        },
        Err(e) => {
            tracing::warn!(error = %e, "cache statistics unavailable");
            CacheHealth {
                status: HealthStatus::Unhealthy,
                entries: 0,
                hit_rate: 0.0,
            }
        }
    };

    let status = HealthStatus::from_ok(
        database.status == HealthStatus::Healthy && cache.status == HealthStatus::Healthy,
    );
    let code = match status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    let response = HealthResponse {
        status,
        details: Some(ReadinessDetails {
            database,
            cache,
            active_sessions: sessions.len(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: start_time.elapsed().as_secs(),
        }),
    };
    (code, Json(response))
}

async fn check_database(dashboard: &CachedDashboard) -> DatabaseHealth {
    let start = Instant::now();
    match dashboard.source().health_check().await {
        Ok(()) => DatabaseHealth {
            status: HealthStatus::Healthy,
            latency_ms: Some(start.elapsed().as_millis() as u64),
            error: None,
        },
        Err(e) => DatabaseHealth {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            error: Some(e.message),
        },
    }
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
}
