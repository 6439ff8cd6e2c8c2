use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::readings::ReadingError;

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            AppError::Internal(e) => {
                error!(error = %e, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<ReadingError> for AppError {
    fn from(e: ReadingError) -> Self {
        match e {
            ReadingError::Validation(_) => Self::BadRequest(e.to_string()),
            ReadingError::UnknownMetric(_) => Self::NotFound(e.to_string()),
            ReadingError::Store(inner) => Self::Internal(inner.into()),
        }
    }
}
