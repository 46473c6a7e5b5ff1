pub mod checker;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;

use axum::routing::get;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// The full application router. CORS is layered on by the binary, which owns
/// the configuration.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/links", routes::links::link_routes())
        .route("/status", get(handlers::status::status))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}
