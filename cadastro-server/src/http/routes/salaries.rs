//! Salary endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    routing::{delete, get},
    Json, Router,
};

use super::common::{deleted, updated, DeletedResponse};
use crate::db::{Record, RecordRepo, SalaryInput};
use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, RecordKey};
use crate::http::server::AppState;

const RESOURCE: &str = "salary";

/// GET /api/salario
async fn list_salaries(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Record>>, ApiError> {
    const ACTION: &str = "failed to list salaries";
    let mut conn = state.db.acquire().await.map_err(ApiError::store(ACTION))?;
    let rows = RecordRepo::salaries(state.db.schema())
        .list(&mut conn)
        .await
        .map_err(ApiError::store(ACTION))?;
    Ok(Json(rows))
}

/// POST /api/salario
async fn create_salary(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<SalaryInput>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    const ACTION: &str = "failed to create salary";
    let mut conn = state.db.acquire().await.map_err(ApiError::store(ACTION))?;
    let row = RecordRepo::salaries(state.db.schema())
        .insert(&mut conn, &input)
        .await
        .map_err(ApiError::store(ACTION))?;

    tracing::info!(login = %row.text("login"), "salary created");
    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/salario - replaces `transacao`
async fn update_salary(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<SalaryInput>,
) -> Result<Response, ApiError> {
    const ACTION: &str = "failed to update salary";
    let mut conn = state.db.acquire().await.map_err(ApiError::store(ACTION))?;
    let row = RecordRepo::salaries(state.db.schema())
        .update(&mut conn, &input)
        .await
        .map_err(ApiError::store(ACTION))?;

    updated(row, state.update_policy, RESOURCE, &input.key())
}

/// DELETE /api/salario/{login}
async fn delete_salary(
    State(state): State<Arc<AppState>>,
    RecordKey(login): RecordKey,
) -> Result<Json<DeletedResponse<Record>>, ApiError> {
    const ACTION: &str = "failed to delete salary";
    let mut conn = state.db.acquire().await.map_err(ApiError::store(ACTION))?;
    let row = RecordRepo::salaries(state.db.schema())
        .delete(&mut conn, &login)
        .await
        .map_err(ApiError::store(ACTION))?;

    deleted(row, RESOURCE, login)
}

/// Salary routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/salario",
            get(list_salaries).post(create_salary).put(update_salary),
        )
        .route("/api/salario/{login}", delete(delete_salary))
}
