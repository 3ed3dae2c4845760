//! Response shapes shared by the three resources

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::config::UpdatePolicy;
use crate::http::error::ApiError;

/// Body of a successful DELETE
#[derive(Debug, Serialize)]
pub struct DeletedResponse<T> {
    pub message: String,
    pub deleted: T,
}

/// Answer a DELETE: the removed row, or 404 when the key matched nothing.
pub fn deleted<T: Serialize>(
    row: Option<T>,
    resource: &'static str,
    key: String,
) -> Result<Json<DeletedResponse<T>>, ApiError> {
    match row {
        Some(deleted) => {
            tracing::info!(resource, key = %key, "record deleted");
            Ok(Json(DeletedResponse {
                message: format!("{} deleted", resource),
                deleted,
            }))
        }
        None => Err(ApiError::NotFound { resource, key }),
    }
}

/// Answer a PUT.
///
/// Under [`UpdatePolicy::Lenient`] a key that matched nothing still gets a
/// 200, with an empty body.
pub fn updated<T: Serialize>(
    row: Option<T>,
    policy: UpdatePolicy,
    resource: &'static str,
    key: &str,
) -> Result<Response, ApiError> {
    match (row, policy) {
        (Some(row), _) => Ok(Json(row).into_response()),
        (None, UpdatePolicy::Lenient) => {
            tracing::warn!(resource, key, "update matched no row");
            Ok(StatusCode::OK.into_response())
        }
        (None, UpdatePolicy::Strict) => Err(ApiError::NotFound {
            resource,
            key: key.to_string(),
        }),
    }
}
