use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{callback, handlers};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let callback_path = state.callback_path().to_string();

    // API routes
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .with_state(Arc::clone(&state));

    Router::new()
        .route(&callback_path, post(callback::receive_callback))
        .with_state(state)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
}
