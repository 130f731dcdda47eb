//! Prometheus Metrics Definitions
//!
//! Defines all PLANTDASH metrics with appropriate labels and types.
//! Exposes a /metrics endpoint for Prometheus scraping.

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_histogram_vec, CounterVec, Encoder, Gauge,
    HistogramVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
/// Covers: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Database query latency buckets (seconds)
const DB_LATENCY_BUCKETS: &[f64] =
    &[0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0, 30.0];

/// Global metrics instance - initialized once at startup
pub static METRICS: Lazy<ApiResult<DashboardMetrics>> = Lazy::new(DashboardMetrics::new);

/// Container for all PLANTDASH metrics.
#[derive(Clone)]
pub struct DashboardMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Database query counter - labels: operation, status
    pub db_queries_total: CounterVec,

    /// Database query duration histogram - labels: operation
    pub db_query_duration_seconds: HistogramVec,

    /// Query cache reads - labels: operation, outcome (hit/miss/error)
    pub cache_reads_total: CounterVec,

    /// Active login sessions
    pub active_sessions: Gauge,

    /// Login attempts - labels: outcome (success/failure)
    pub logins_total: CounterVec,
}

impl DashboardMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "plantdash_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| registration_error("http_requests_total", e))?,

            http_request_duration_seconds: register_histogram_vec!(
                "plantdash_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| registration_error("http_request_duration_seconds", e))?,

            db_queries_total: register_counter_vec!(
                "plantdash_db_queries_total",
                "Total number of database queries",
                &["operation", "status"]
            )
            .map_err(|e| registration_error("db_queries_total", e))?,

            db_query_duration_seconds: register_histogram_vec!(
                "plantdash_db_query_duration_seconds",
                "Database query duration in seconds",
                &["operation"],
                DB_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| registration_error("db_query_duration_seconds", e))?,

            cache_reads_total: register_counter_vec!(
                "plantdash_cache_reads_total",
                "Query cache reads by outcome",
                &["operation", "outcome"]
            )
            .map_err(|e| registration_error("cache_reads_total", e))?,

            active_sessions: register_gauge!(
                "plantdash_active_sessions",
                "Current number of login sessions"
            )
            .map_err(|e| registration_error("active_sessions", e))?,

            logins_total: register_counter_vec!(
                "plantdash_logins_total",
                "Login attempts by outcome",
                &["outcome"]
            )
            .map_err(|e| registration_error("logins_total", e))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, status_str.as_str()])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record a database query.
    pub fn record_db_operation(&self, operation: &str, success: bool, duration_secs: f64) {
        let status = if success { "success" } else { "error" };
        self.db_queries_total
            .with_label_values(&[operation, status])
            .inc();
        self.db_query_duration_seconds
            .with_label_values(&[operation])
            .observe(duration_secs);
    }

    /// Record how a cached read was served.
    pub fn record_cache_read(&self, operation: &str, outcome: CacheOutcome) {
        self.cache_reads_total
            .with_label_values(&[operation, outcome.as_str()])
            .inc();
    }

    pub fn set_active_sessions(&self, count: usize) {
        self.active_sessions.set(count as f64);
    }

    pub fn record_login(&self, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        self.logins_total.with_label_values(&[outcome]).inc();
    }
}

/// How a cached read was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
    Error,
}

impl CacheOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheOutcome::Hit => "hit",
            CacheOutcome::Miss => "miss",
            CacheOutcome::Error => "error",
        }
    }
}

fn registration_error(name: &str, err: prometheus::Error) -> ApiError {
    ApiError::internal_error(format!("Failed to register {}: {}", name, err))
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::core::Collector;

    #[test]
    fn test_metrics_creation() -> Result<(), String> {
        let metrics = METRICS
            .as_ref()
            .map_err(|e| format!("Metrics init failed: {}", e.message))?;
        assert!(!metrics.http_requests_total.desc().is_empty());
        Ok(())
    }

    #[test]
    fn test_record_cache_reads() -> Result<(), String> {
        let metrics = METRICS
            .as_ref()
            .map_err(|e| format!("Metrics init failed: {}", e.message))?;
        let before = metrics
            .cache_reads_total
            .with_label_values(&["test_cache_op", "hit"])
            .get();
        metrics.record_cache_read("test_cache_op", CacheOutcome::Hit);
        metrics.record_cache_read("test_cache_op", CacheOutcome::Miss);
        let after = metrics
            .cache_reads_total
            .with_label_values(&["test_cache_op", "hit"])
            .get();
        assert_eq!(after - before, 1.0);
        Ok(())
    }

    #[test]
    fn test_record_db_operation() -> Result<(), String> {
        let metrics = METRICS
            .as_ref()
            .map_err(|e| format!("Metrics init failed: {}", e.message))?;
        metrics.record_db_operation("plant_summary", true, 0.005);
        metrics.record_db_operation("outages", false, 0.010);
        Ok(())
    }
}
