//! HTTP layer
//!
//! Axum server with:
//! - single-origin CORS
//! - request tracing
//! - graceful shutdown that closes the connection pool
//! - JSON error bodies of the form `{"error": "..."}`

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, run_server, AppState, ServerError};
