//! Login Routes
//!
//! - POST /auth/login - exchange username and password for a bearer token
//! - POST /auth/logout - end the caller's session
//! - GET /auth/me - the logged-in user

use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use plantdash_core::UserRecord;
use serde::{Deserialize, Serialize};

use crate::auth::{authenticate, SessionStore};
use crate::cached_db::CachedDashboard;
use crate::error::{ApiError, ApiResult};
use crate::middleware::{auth_middleware, CurrentUser};
use crate::state::AppState;
use crate::telemetry::METRICS;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// A user as shown in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub role: String,
    /// Full name, or the username when no full name is set.
    pub display_name: String,
}

impl From<&UserRecord> for UserResponse {
    fn from(user: &UserRecord) -> Self {
        Self {
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            role: user.role.clone(),
            display_name: user.display_name().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
    pub expires_at: DateTime<Utc>,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// POST /auth/login
pub async fn login(
    State(dashboard): State<CachedDashboard>,
    State(sessions): State<SessionStore>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.username.trim().is_empty() {
        return Err(ApiError::missing_field("username"));
    }
    if req.password.is_empty() {
        return Err(ApiError::missing_field("password"));
    }

    let result = authenticate(dashboard.source(), &req.username, &req.password).await;
    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_login(result.is_ok());
    }
    let user = result?;

    let (token, session) = sessions.create(user);
    Ok(Json(LoginResponse {
        token,
        user: UserResponse::from(&session.user),
        expires_at: session.expires_at,
    }))
}

/// POST /auth/logout
pub async fn logout(
    State(sessions): State<SessionStore>,
    current: CurrentUser,
) -> impl IntoResponse {
    sessions.revoke(&current.token);
    StatusCode::NO_CONTENT
}

/// GET /auth/me
pub async fn me(current: CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(&current.session.user))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router(sessions: SessionStore) -> Router<AppState> {
    let protected = Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route_layer(from_fn_with_state(sessions, auth_middleware));

    Router::new().route("/login", post(login)).merge(protected)
}
