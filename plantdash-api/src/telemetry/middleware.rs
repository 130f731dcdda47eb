//! Axum Middleware for HTTP Request Tracing and Metrics
//!
//! Wraps every HTTP request in a tracing span and records Prometheus
//! metrics for it.

use axum::{extract::Request, middleware::Next, response::Response};
use once_cell::sync::Lazy;
use plantdash_core::Panel;
use regex::Regex;
use std::time::Instant;
use tracing::{info_span, Instrument};

use super::metrics::METRICS;
use crate::cached_db::CACHED_OPERATIONS;

/// Label for any path that is not a served route.
const UNMATCHED_ROUTE: &str = "unmatched";

/// Routes without path parameters.
const STATIC_ROUTES: &[&str] = &[
    "/auth/login",
    "/auth/logout",
    "/auth/me",
    "/api/v1/navigation",
    "/api/v1/cache/stats",
    "/api/v1/cache/invalidate",
    "/health/ping",
    "/health/live",
    "/health/ready",
    "/metrics",
];

static PARAM_ROUTE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^/api/v1/(panels|cache/invalidate)/([^/]+)$").ok());

/// Map a request path to a bounded route label for metrics and spans.
///
/// Parameters are kept only when they name a known panel or cache
/// operation; anything else collapses to a placeholder or
/// [`UNMATCHED_ROUTE`].
fn route_label(path: &str) -> String {
    if STATIC_ROUTES.contains(&path) {
        return path.to_string();
    }
    let Some(caps) = PARAM_ROUTE.as_ref().and_then(|re| re.captures(path)) else {
        return UNMATCHED_ROUTE.to_string();
    };

    let (kind, param) = (&caps[1], &caps[2]);
    let known = match kind {
        "panels" => param.parse::<Panel>().ok().map(|panel| panel.slug()),
        _ => CACHED_OPERATIONS.iter().copied().find(|op| *op == param),
    };
    match known {
        Some(name) => format!("/api/v1/{}/{}", kind, name),
        None => format!("/api/v1/{}/{{unknown}}", kind),
    }
}

/// Observability middleware for Axum.
///
/// Runs the request inside an `http_request` span, then records latency and
/// status in Prometheus and logs completion.
pub async fn observability_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let route = route_label(&path);

    let span = info_span!(
        "http_request",
        http.method = %method,
        http.target = %path,
        http.route = %route,
        username = tracing::field::Empty,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    let status = response.status();

    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_http_request(
            method.as_str(),
            &route,
            status.as_u16(),
            duration.as_secs_f64(),
        );
    }

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis(),
            "Request failed"
        );
    } else {
        tracing::info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis(),
            "Request completed"
        );
    }

    response
}
