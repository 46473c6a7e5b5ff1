use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;

use crate::checker::{self, CheckOutcome, NO_CHANGES_MESSAGE};
use crate::error::ApiError;
use crate::models::check::CheckRecord;
use crate::models::link::Link;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateLinkPayload {
    pub url: Option<String>,
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
}

pub async fn create_link(
    Extension(state): Extension<AppState>,
    Json(payload): Json<CreateLinkPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let url = payload.url.as_deref().map(str::trim).unwrap_or("");
    if url.is_empty() {
        return Err(ApiError::InvalidInput("URL is required".to_string()));
    }

    let link = Link::create(
        &state.pool,
        url,
        payload.title,
        payload.tags.unwrap_or_default(),
    )
    .await?;

    tracing::info!(link_id = %link.id, url = %link.url, "link created");
    Ok((StatusCode::CREATED, Json(link)))
}

pub async fn list_links(
    Extension(state): Extension<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let links = Link::list(&state.pool).await?;
    Ok(Json(links))
}

pub async fn check_link(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let link = Link::find_by_id(&state.pool, &id)
        .await?
        .ok_or(ApiError::NotFound("Link"))?;

    match checker::run_check(&state, &link).await? {
        CheckOutcome::NoChanges => Ok(Json(json!({
            "message": NO_CHANGES_MESSAGE,
            "linkId": link.id,
        }))),
        CheckOutcome::Recorded(record) => Ok(Json(json!(record))),
    }
}

pub async fn link_history(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let checks = CheckRecord::list_for(&state.pool, &id).await?;
    Ok(Json(checks))
}
