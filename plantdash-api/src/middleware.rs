//! Authentication Middleware
//!
//! Resolves `Authorization: Bearer <token>` to a [`Session`] and places it in
//! the request extensions for handlers to extract.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::auth::{Session, SessionStore};
use crate::error::ApiError;

/// The authenticated caller, as injected by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub session: Session,
}

/// Pull the bearer token out of an `Authorization` header value.
pub fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Reject requests without a live session.
///
/// Missing, unknown and expired tokens all answer 401.
pub async fn auth_middleware(
    State(sessions): State<SessionStore>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Authentication required: log in first"))?;

    let token = bearer_token(header_value).ok_or_else(|| {
        ApiError::invalid_token("Authorization header must use the Bearer scheme")
    })?;

    let session = sessions.validate(token)?;
    tracing::Span::current().record("username", session.user.username.as_str());

    let auth = AuthSession {
        token: token.to_string(),
        session,
    };
    request.extensions_mut().insert(auth);

    Ok(next.run(request).await)
}

/// Extractor for the authenticated caller.
///
/// Requires [`auth_middleware`] on the route; without it the extractor
/// answers 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthSession);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthSession>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| ApiError::unauthorized("Session missing from request"))
    }
}

impl std::ops::Deref for CurrentUser {
    type Target = AuthSession;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
