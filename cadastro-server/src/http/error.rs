//! API error type with IntoResponse
//!
//! Store failures are returned with their message verbatim, prefixed by the
//! action that failed. Constraint violations are not translated; a duplicate
//! key is a 500 like any other store error.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::DbError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Malformed body or blank key (400)
    BadRequest { message: String },

    /// Key matched no row (404)
    NotFound { resource: &'static str, key: String },

    /// Relational or document store failure (500, logged)
    Store {
        action: &'static str,
        source: DbError,
    },
}

impl ApiError {
    /// Adapter for `map_err`: tag a store error with the action that failed.
    pub fn store(action: &'static str) -> impl FnOnce(DbError) -> Self {
        move |source| Self::Store { action, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::BadRequest { message } => message.clone(),
            Self::NotFound { resource, key } => format!("{} '{}' not found", resource, key),
            Self::Store { action, source } => format!("{}: {}", action, source),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        if let Self::Store { source, .. } = &self {
            tracing::error!(error = ?source, "{}", message);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
