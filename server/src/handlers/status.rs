use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;

use crate::state::AppState;

/// Liveness flags for the backend, the database, and the summarizer
/// credential. Never fails: a broken database reports as disconnected.
pub async fn status(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let database = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };
    let llm = if state.summarizer.is_configured() {
        "configured"
    } else {
        "unconfigured"
    };

    Json(json!({
        "backend": "ok",
        "database": database,
        "llm": llm,
    }))
}
