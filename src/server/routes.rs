//! Router configuration for the control surface.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the control router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(handlers::status))
        .route("/start", post(handlers::start))
        .route("/stop", post(handlers::stop))
        .route("/check", post(handlers::check))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
