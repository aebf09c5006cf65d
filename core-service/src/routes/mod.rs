//! HTTP routes of the sync service.

pub mod auth;
pub mod health;
pub mod sync;

use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use core_runtime::config::OAUTH_CALLBACK_PATH;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the application router.
pub fn build(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/api/sync/folder", post(sync::sync_folder))
        .route("/api/sync/all", post(sync::sync_all))
        .route("/api/auth/google", get(auth::start))
        .route(OAUTH_CALLBACK_PATH, get(auth::callback))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
