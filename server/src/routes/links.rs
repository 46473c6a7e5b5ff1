use axum::routing::{get, post};
use axum::Router;

use crate::handlers::link_handlers::{check_link, create_link, link_history, list_links};

pub fn link_routes() -> Router {
    Router::new()
        .route("/", post(create_link).get(list_links))
        .route("/{id}/check", post(check_link))
        .route("/{id}/history", get(link_history))
}
