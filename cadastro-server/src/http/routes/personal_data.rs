//! Personal data endpoints
//!
//! Only creation touches the document store; PUT and DELETE leave the mirror
//! document as it was.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    routing::{delete, get},
    Json, Router,
};

use super::common::{deleted, updated, DeletedResponse};
use crate::db::{PersonalDataInput, Record, RecordRepo};
use crate::dual_write::{create_personal_data, PersonalDataCreated};
use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, RecordKey};
use crate::http::server::AppState;

const RESOURCE: &str = "personal data";

/// GET /api/dados-pessoais
async fn list_personal_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Record>>, ApiError> {
    const ACTION: &str = "failed to list personal data";
    let mut conn = state.db.acquire().await.map_err(ApiError::store(ACTION))?;
    let rows = RecordRepo::personal_data(state.db.schema())
        .list(&mut conn)
        .await
        .map_err(ApiError::store(ACTION))?;

    tracing::debug!(rows = rows.len(), "listed personal data");
    Ok(Json(rows))
}

/// POST /api/dados-pessoais - insert and mirror
async fn create(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<PersonalDataInput>,
) -> Result<(StatusCode, Json<PersonalDataCreated>), ApiError> {
    tracing::debug!(usuario = %input.key(), "creating personal data");
    let created = create_personal_data(&state.db, state.mirror.as_ref(), &input)
        .await
        .map_err(ApiError::store("failed to create personal data"))?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/dados-pessoais - overwrite by `usuario`
async fn update(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<PersonalDataInput>,
) -> Result<Response, ApiError> {
    const ACTION: &str = "failed to update personal data";
    tracing::debug!(usuario = %input.key(), "updating personal data");
    let mut conn = state.db.acquire().await.map_err(ApiError::store(ACTION))?;
    let row = RecordRepo::personal_data(state.db.schema())
        .update(&mut conn, &input)
        .await
        .map_err(ApiError::store(ACTION))?;

    updated(row, state.update_policy, RESOURCE, &input.key())
}

/// DELETE /api/dados-pessoais/{usuario}
async fn remove(
    State(state): State<Arc<AppState>>,
    RecordKey(usuario): RecordKey,
) -> Result<Json<DeletedResponse<Record>>, ApiError> {
    const ACTION: &str = "failed to delete personal data";
    let mut conn = state.db.acquire().await.map_err(ApiError::store(ACTION))?;
    let row = RecordRepo::personal_data(state.db.schema())
        .delete(&mut conn, &usuario)
        .await
        .map_err(ApiError::store(ACTION))?;

    deleted(row, RESOURCE, usuario)
}

/// Personal data routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/dados-pessoais",
            get(list_personal_data).post(create).put(update),
        )
        .route("/api/dados-pessoais/{usuario}", delete(remove))
}
