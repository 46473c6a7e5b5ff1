use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use watch_service_cli::fetch::FetchError;

/// Failures a request handler can surface. Summarization problems are not
/// here: they degrade into the persisted record's summary text instead of
/// failing the request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("check failed: {0}")]
    FetchFailed(#[from] FetchError),

    #[error("database error: {0}")]
    Persistence(#[from] sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::InvalidInput(message) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("{what} not found") }),
            ),
            ApiError::FetchFailed(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Check failed", "details": err.to_string() }),
            ),
            ApiError::Persistence(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Database error", "details": err.to_string() }),
            ),
        };
        (status, Json(body)).into_response()
    }
}
