//! Contact endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    routing::{delete, get},
    Json, Router,
};

use super::common::{deleted, updated, DeletedResponse};
use crate::db::{ContactInput, Record, RecordRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, RecordKey};
use crate::http::server::AppState;

const RESOURCE: &str = "contact";

/// GET /api/contato
async fn list_contacts(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Record>>, ApiError> {
    const ACTION: &str = "failed to list contacts";
    let mut conn = state.db.acquire().await.map_err(ApiError::store(ACTION))?;
    let rows = RecordRepo::contacts(state.db.schema())
        .list(&mut conn)
        .await
        .map_err(ApiError::store(ACTION))?;
    Ok(Json(rows))
}

/// POST /api/contato
async fn create_contact(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<ContactInput>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    const ACTION: &str = "failed to create contact";
    tracing::debug!(login = %input.key(), "creating contact");
    let mut conn = state.db.acquire().await.map_err(ApiError::store(ACTION))?;
    let row = RecordRepo::contacts(state.db.schema())
        .insert(&mut conn, &input)
        .await
        .map_err(ApiError::store(ACTION))?;

    tracing::info!(login = %row.text("login"), "contact created");
    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/contato - overwrite by `login`
async fn update_contact(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<ContactInput>,
) -> Result<Response, ApiError> {
    const ACTION: &str = "failed to update contact";
    tracing::debug!(login = %input.key(), "updating contact");
    let mut conn = state.db.acquire().await.map_err(ApiError::store(ACTION))?;
    let row = RecordRepo::contacts(state.db.schema())
        .update(&mut conn, &input)
        .await
        .map_err(ApiError::store(ACTION))?;

    updated(row, state.update_policy, RESOURCE, &input.key())
}

/// DELETE /api/contato/{login}
async fn delete_contact(
    State(state): State<Arc<AppState>>,
    RecordKey(login): RecordKey,
) -> Result<Json<DeletedResponse<Record>>, ApiError> {
    const ACTION: &str = "failed to delete contact";
    let mut conn = state.db.acquire().await.map_err(ApiError::store(ACTION))?;
    let row = RecordRepo::contacts(state.db.schema())
        .delete(&mut conn, &login)
        .await
        .map_err(ApiError::store(ACTION))?;

    deleted(row, RESOURCE, login)
}

/// Contact routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/contato",
            get(list_contacts).post(create_contact).put(update_contact),
        )
        .route("/api/contato/{login}", delete(delete_contact))
}
