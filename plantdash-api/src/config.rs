//! API Configuration Module
//!
//! Settings for CORS, cache lifetimes, and login sessions. Configuration is
//! loaded from environment variables with defaults suitable for development.

use std::time::Duration;

/// Default lifetime of the filter option lists.
pub const DEFAULT_FILTER_TTL: Duration = Duration::from_secs(900);
/// Default lifetime of the plant summary table.
pub const DEFAULT_SUMMARY_TTL: Duration = Duration::from_secs(120);
/// Default lifetime of the other panel tables.
pub const DEFAULT_PANEL_TTL: Duration = Duration::from_secs(300);
/// Default lifetime of a login session.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(8 * 60 * 60);

// ============================================================================
// CACHE LIFETIMES
// ============================================================================

/// Time-to-live for each family of cached queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    /// Dropdown option lists for plant search.
    pub filter: Duration,
    /// Plant summary with contact and drive counts.
    pub summary: Duration,
    /// Call directory, plant listing, sales activity and outages.
    pub panel: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER_TTL,
            summary: DEFAULT_SUMMARY_TTL,
            panel: DEFAULT_PANEL_TTL,
        }
    }
}

impl CacheTtls {
    /// Environment variables:
    /// - `PLANTDASH_FILTER_TTL_SECS` (default: 900)
    /// - `PLANTDASH_SUMMARY_TTL_SECS` (default: 120)
    /// - `PLANTDASH_PANEL_TTL_SECS` (default: 300)
    pub fn from_env() -> Self {
        Self {
            filter: env_secs("PLANTDASH_FILTER_TTL_SECS", DEFAULT_FILTER_TTL),
            summary: env_secs("PLANTDASH_SUMMARY_TTL_SECS", DEFAULT_SUMMARY_TTL),
            panel: env_secs("PLANTDASH_PANEL_TTL_SECS", DEFAULT_PANEL_TTL),
        }
    }
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for CORS, caching and sessions.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Whether to allow credentials in CORS requests.
    pub cors_allow_credentials: bool,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    pub cache_ttls: CacheTtls,

    /// How long a login stays valid.
    pub session_ttl: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            cors_allow_credentials: false,
            cors_max_age_secs: 86400,
            cache_ttls: CacheTtls::default(),
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `PLANTDASH_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `PLANTDASH_CORS_ALLOW_CREDENTIALS`: "true" or "false" (default: false)
    /// - `PLANTDASH_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `PLANTDASH_SESSION_TTL_SECS`: Login lifetime (default: 28800)
    /// - the cache variables read by [`CacheTtls::from_env`]
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("PLANTDASH_CORS_ORIGINS")
            .ok()
            .map(|s| parse_origins(&s))
            .unwrap_or_default();

        let cors_allow_credentials = std::env::var("PLANTDASH_CORS_ALLOW_CREDENTIALS")
            .ok()
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or(false);

        let cors_max_age_secs = std::env::var("PLANTDASH_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86400);

        Self {
            cors_origins,
            cors_allow_credentials,
            cors_max_age_secs,
            cache_ttls: CacheTtls::from_env(),
            session_ttl: env_secs("PLANTDASH_SESSION_TTL_SECS", DEFAULT_SESSION_TTL),
        }
    }

    /// Check if running in production mode (strict CORS).
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

/// Read a whole number of seconds from `key`. Unset, unparsable, and zero
/// values fall back to `default`.
fn env_secs(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(default)
}
