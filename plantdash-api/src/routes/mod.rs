//! REST API Routes Module
//!
//! Includes:
//! - Login routes under /auth
//! - Navigation, panel and cache routes under /api/v1 (login required)
//! - Health check endpoints (Kubernetes-compatible)
//! - Prometheus metrics at /metrics
//! - CORS support for the browser front-end

pub mod auth;
pub mod cache;
pub mod health;
pub mod panels;

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ApiConfig;
use crate::middleware::auth_middleware;
use crate::state::AppState;
use crate::telemetry::{metrics_handler, observability_middleware};

pub use auth::create_router as auth_router;
pub use cache::create_router as cache_router;
pub use health::create_router as health_router;
pub use panels::create_router as panels_router;

/// Create the complete router.
///
/// # Middleware Order (outer to inner)
/// 1. CORS - handles preflight requests
/// 2. HTTP trace
/// 3. Observability - the `http_request` span and metrics. Its span is the
///    current span while auth runs.
/// 4. Auth (only on /api/v1/* and the session routes under /auth)
pub fn create_api_router(state: AppState, config: &ApiConfig) -> Router {
    let api_routes = Router::new()
        .merge(panels::create_router())
        .nest("/cache", cache::create_router())
        .route_layer(from_fn_with_state(state.sessions.clone(), auth_middleware));

    let router = Router::new()
        .nest("/api/v1", api_routes)
        .nest("/auth", auth::create_router(state.sessions.clone()))
        .nest("/health", health::create_router())
        .route("/metrics", get(metrics_handler))
        .with_state(state);

    // Router::layer wraps outward: the last layer added sees the request first.
    // Layers are applied one at a time so each response body is boxed back
    // into axum's Body (CorsLayer needs a `Default` response body).
    router
        .layer(from_fn(observability_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(config))
}

/// Build the CORS layer from ApiConfig.
///
/// With no configured origins every origin is allowed.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if !config.is_production() {
        tracing::info!("CORS: Development mode - allowing all origins");
        return cors.allow_origin(Any);
    }

    tracing::info!("CORS: allowing origins: {:?}", config.cors_origins);
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    if config.cors_allow_credentials {
        cors.allow_origin(origins).allow_credentials(true)
    } else {
        cors.allow_origin(origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_builds_for_both_modes() {
        let _dev = build_cors_layer(&ApiConfig::default());
        let prod = ApiConfig {
            cors_origins: vec!["https://dash.example.com".to_string()],
            cors_allow_credentials: true,
            ..ApiConfig::default()
        };
        let _prod = build_cors_layer(&prod);
    }
}
