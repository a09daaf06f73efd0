//! API route modules.

pub mod health;
pub mod projects;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the main router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new().route("/health", get(health::health_check));

    Router::new()
        .merge(public_routes)
        .nest("/api", projects::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
