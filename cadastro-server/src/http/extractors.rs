//! Custom Axum extractors

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use super::error::ApiError;

/// JSON body whose rejections use the API error shape.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ApiError::BadRequest {
                message: rejection.body_text(),
            })?;
        Ok(Self(value))
    }
}

/// Record key from the last path segment; blank keys are a 400.
pub struct RecordKey(pub String);

impl<S> FromRequestParts<S> for RecordKey
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(key): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| missing_key())?;

        if key.trim().is_empty() {
            return Err(missing_key());
        }
        Ok(Self(key))
    }
}

fn missing_key() -> ApiError {
    ApiError::BadRequest {
        message: "the record key is required".into(),
    }
}
