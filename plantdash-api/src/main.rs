//! PLANTDASH API Server Entry Point
//!
//! `plantdash-api` starts the HTTP server.
//! `plantdash-api hash-password` reads a password from stdin and prints its
//! Argon2 hash for the `dashboard_users` table.

use std::io::BufRead;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use plantdash_api::telemetry::{init_tracer, TelemetryConfig};
use plantdash_api::{
    create_api_router, hash_password, ApiConfig, ApiError, ApiResult, AppState, DbClient,
    DbConfig, SessionStore,
};

/// How often expired sessions are swept.
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> ApiResult<()> {
    if std::env::args().nth(1).as_deref() == Some("hash-password") {
        return print_password_hash();
    }

    let telemetry_config = TelemetryConfig::default();
    init_tracer(&telemetry_config)?;

    let db_config = DbConfig::from_env()?;
    let db = DbClient::from_config(&db_config)?;

    let api_config = ApiConfig::from_env();
    let state = AppState::new(Arc::new(db.clone()), &api_config);
    spawn_session_purge(state.sessions.clone());

    let app: Router = create_api_router(state, &api_config);

    let addr = resolve_bind_addr()?;
    tracing::info!(%addr, "Starting PLANTDASH API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    db.close();
    Ok(())
}

fn spawn_session_purge(sessions: SessionStore) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            sessions.purge_expired(chrono::Utc::now());
        }
    });
}

fn print_password_hash() -> ApiResult<()> {
    let mut password = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut password)
        .map_err(|e| ApiError::internal_error(format!("Failed to read stdin: {}", e)))?;
    let password = password.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(ApiError::missing_field("password"));
    }
    println!("{}", hash_password(password)?);
    Ok(())
}

fn resolve_bind_addr() -> ApiResult<SocketAddr> {
    let host = std::env::var("PLANTDASH_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port_str = std::env::var("PORT")
        .ok()
        .or_else(|| std::env::var("PLANTDASH_PORT").ok())
        .unwrap_or_else(|| "8501".to_string());
    let port = port_str
        .parse::<u16>()
        .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", port_str)))?;

    let addr = format!("{}:{}", host, port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}
