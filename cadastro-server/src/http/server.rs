//! Axum server setup
//!
//! - CORS for exactly one origin, GET/POST/PUT/DELETE, `Content-Type` only
//! - Tracing middleware
//! - Static entry document served from the configured directory
//! - Graceful shutdown on SIGTERM/Ctrl+C, then the pool is closed

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::config::{ServerConfig, UpdatePolicy};
use crate::db::ConnectionManager;
use crate::docstore::DocumentStore;

/// Shared application state
pub struct AppState {
    pub db: ConnectionManager,
    pub mirror: Arc<dyn DocumentStore>,
    pub update_policy: UpdatePolicy,
}

impl AppState {
    pub fn new(db: ConnectionManager, mirror: Arc<dyn DocumentStore>) -> Self {
        Self {
            db,
            mirror,
            update_policy: UpdatePolicy::default(),
        }
    }

    pub fn with_update_policy(mut self, policy: UpdatePolicy) -> Self {
        self.update_policy = policy;
        self
    }
}

/// Build the application router.
pub fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Result<Router, ServerError> {
    let origin: HeaderValue = config
        .cors_origin
        .parse()
        .map_err(|_| ServerError::InvalidOrigin(config.cors_origin.clone()))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::personal_data::router())
        .merge(routes::contacts::router())
        .merge(routes::salaries::router())
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Run the HTTP server until a shutdown signal arrives.
///
/// # Example
///
/// ```ignore
/// let db = ConnectionManager::new(DatabaseConfig::new(url));
/// let state = Arc::new(AppState::new(db, mirror));
/// run_server(state, ServerConfig::default()).await?;
/// ```
pub async fn run_server(state: Arc<AppState>, config: ServerConfig) -> Result<(), ServerError> {
    let app = build_router(state.clone(), &config)?;

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        cors_origin = %config.cors_origin,
        static_dir = %config.static_dir.display(),
        mirror = state.mirror.backend(),
        "server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.db.close().await;
    tracing::info!("server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid CORS origin: {0}")]
    InvalidOrigin(String),
}
