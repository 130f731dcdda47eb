//! Login Gate
//!
//! Password verification against stored Argon2 hashes and an in-process
//! session store keyed by opaque bearer tokens.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use plantdash_core::UserRecord;
use rand::RngCore;
use secrecy::ExposeSecret;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::source::DashboardSource;
use crate::telemetry::METRICS;

/// Random bytes behind each session token.
const TOKEN_BYTES: usize = 32;

/// Verified against when the username is unknown, so both rejections cost
/// one Argon2 verification.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("plantdash-unknown-user").ok());

// ============================================================================
// PASSWORDS
// ============================================================================

/// Hash a password with Argon2id and a fresh salt, producing a PHC string
/// suitable for `dashboard_users.password_hash`.
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal_error(format!("Password hashing failed: {}", e)))
}

/// Check `password` against a stored PHC hash.
///
/// Returns `Ok(false)` on mismatch and an error only if the stored hash
/// cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> ApiResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| ApiError::internal_error(format!("Invalid password hash format: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Look up `username` and verify `password`.
///
/// Unknown users and wrong passwords produce the same error.
pub async fn authenticate(
    source: &dyn DashboardSource,
    username: &str,
    password: &str,
) -> ApiResult<UserRecord> {
    let Some(stored) = source.find_user(username.trim()).await? else {
        tracing::info!(username, "login rejected: unknown user");
        return Err(reject_unknown_user(password));
    };

    if !verify_password(password, stored.password_hash.expose_secret())? {
        tracing::info!(username, "login rejected: wrong password");
        return Err(ApiError::invalid_credentials());
    }

    Ok(stored.record)
}

fn reject_unknown_user(password: &str) -> ApiError {
    match DUMMY_HASH.as_deref() {
        Some(hash) => {
            let _ = verify_password(password, hash);
        }
        None => tracing::warn!("dummy password hash unavailable"),
    }
    ApiError::invalid_credentials()
}

// ============================================================================
// SESSIONS
// ============================================================================

/// A logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Log-safe identifier. The token itself is never logged.
    pub id: Uuid,
    pub user: UserRecord,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Sessions keyed by bearer token, shared by every request.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Open a session for `user`. Returns the bearer token and the session.
    pub fn create(&self, user: UserRecord) -> (String, Session) {
        self.create_at(user, Utc::now())
    }

    pub fn create_at(&self, user: UserRecord, now: DateTime<Utc>) -> (String, Session) {
        let token = generate_token();
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::MAX);
        let session = Session {
            id: Uuid::new_v4(),
            user,
            created_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };

        self.sessions.insert(token.clone(), session.clone());
        self.publish_count();
        tracing::info!(
            session_id = %session.id,
            username = %session.user.username,
            expires_at = %session.expires_at,
            "session opened"
        );
        (token, session)
    }

    pub fn validate(&self, token: &str) -> ApiResult<Session> {
        self.validate_at(token, Utc::now())
    }

    /// Resolve `token` to its session. Expired sessions are removed.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> ApiResult<Session> {
        let session = self
            .sessions
            .get(token)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ApiError::invalid_token("Unknown or revoked session"))?;

        if session.is_expired_at(now) {
            self.sessions.remove(token);
            self.publish_count();
            tracing::debug!(session_id = %session.id, "session expired");
            return Err(ApiError::token_expired());
        }

        Ok(session)
    }

    /// End the session behind `token`. Returns whether one existed.
    pub fn revoke(&self, token: &str) -> bool {
        let removed = self.sessions.remove(token);
        self.publish_count();
        if let Some((_, session)) = &removed {
            tracing::info!(session_id = %session.id, username = %session.user.username, "session closed");
        }
        removed.is_some()
    }

    /// Drop every session expired at `now`. Returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired_at(now));
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            self.publish_count();
            tracing::debug!(removed, "expired sessions purged");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn publish_count(&self) {
        if let Ok(metrics) = METRICS.as_ref() {
            metrics.set_active_sessions(self.sessions.len());
        }
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
