//! PLANTDASH API - Power-Plant Dashboard Service
//!
//! Serves the dashboard's five panels over HTTP behind a login gate. Panel
//! data comes from PostgreSQL through a time-bounded query cache shared by
//! every session.

#[macro_use]
pub mod macros;

pub mod auth;
pub mod cached_db;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod panels;
pub mod queries;
pub mod routes;
pub mod source;
pub mod state;
pub mod telemetry;

// Re-export commonly used types
pub use auth::{authenticate, hash_password, verify_password, Session, SessionStore};
pub use cached_db::CachedDashboard;
pub use config::{ApiConfig, CacheTtls};
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use middleware::{auth_middleware, AuthSession, CurrentUser};
pub use panels::{dispatch, PanelRenderer, PanelView, SearchFilters};
pub use queries::TableQuery;
pub use routes::create_api_router;
pub use source::{DashboardSource, StoredUser};
pub use state::AppState;
