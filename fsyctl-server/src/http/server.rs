//! Axum server setup
//!
//! - Localhost-only CORS by default
//! - Tracing and per-request timeout middleware
//! - Bearer session check on everything under /api except login/signup
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::middleware::from_fn_with_state;
use axum::Router;
use serde::Deserialize;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::middleware::require_session;
use super::routes;
use crate::auth::{AuthError, SessionKeys};
use crate::config::AppConfig;
use crate::sms::{SemaphoreClient, SmsError, SmsGateway};

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:3030)
    pub bind_addr: SocketAddr,

    /// Allow any origin (default: false = localhost only)
    pub cors_permissive: bool,

    /// Per-request time limit
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3030)),
            cors_permissive: false,
            request_timeout_secs: 30,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub sessions: SessionKeys,
    /// `None` when no gateway API key is configured
    pub sms: Option<Arc<dyn SmsGateway>>,
    pub low_registration_threshold: i64,
}

impl AppState {
    /// Assemble state from loaded configuration.
    ///
    /// A session secret is mandatory; the SMS gateway is optional.
    pub fn from_config(pool: PgPool, config: &AppConfig) -> Result<Self, ServerError> {
        let secret = config
            .auth
            .session_secret
            .as_deref()
            .ok_or(ServerError::MissingSecret)?;
        let sessions = SessionKeys::new(secret, Duration::from_secs(config.auth.session_ttl_secs))?;

        let sms = match config.sms.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => {
                let client = SemaphoreClient::new(
                    config.sms.base_url.clone(),
                    key.trim(),
                    config.sms.sender_name.clone(),
                )?;
                Some(Arc::new(client) as Arc<dyn SmsGateway>)
            }
            _ => None,
        };

        Ok(Self {
            pool,
            sessions,
            sms,
            low_registration_threshold: config.reports.low_registration_threshold,
        })
    }
}

const LOCAL_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:3030",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:3030",
];

fn cors_layer(permissive: bool) -> CorsLayer {
    if permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        return CorsLayer::permissive();
    }
    CorsLayer::new()
        .allow_origin(LOCAL_ORIGINS.map(HeaderValue::from_static))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the full application router.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let state = Arc::new(state);

    let protected = Router::new()
        .merge(routes::reference::router())
        .merge(routes::registrations::router())
        .merge(routes::companies::router())
        .merge(routes::members::router())
        .merge(routes::events::router())
        .merge(routes::reports::router())
        .merge(routes::sms::router())
        .route_layer(from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(routes::health::router())
        .merge(routes::auth::router())
        .merge(protected)
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(cors_layer(config.cors_permissive))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until a shutdown signal arrives.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&database_url).await?;
/// let state = AppState { pool, sessions, sms: None, low_registration_threshold: 10 };
/// run_server(state, ServerConfig::default()).await?;
/// ```
pub async fn run_server(state: AppState, config: ServerConfig) -> Result<(), ServerError> {
    if state.sms.is_none() {
        tracing::warn!("SEMAPHORE_API_KEY not set; /api/send-sms will return 503");
    }
    let app = build_router(state, &config);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no session secret configured (set JWT_SECRET or [auth] session_secret)")]
    MissingSecret,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Sms(#[from] SmsError),
}
