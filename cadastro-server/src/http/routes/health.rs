//! Health check endpoint
//!
//! Reports the process and its collaborators without touching them: the pool
//! is only inspected, never built, so a down database does not turn this red.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::http::server::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Whether the connection pool has been built yet
    pub database_pool: bool,
    /// Document store backend in use
    pub mirror: &'static str,
}

/// GET /health
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        database_pool: state.db.is_initialized(),
        mirror: state.mirror.backend(),
    })
}

/// Health routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}
