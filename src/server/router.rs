use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::server::handlers;
use crate::state::AppState;

/// Creates the application router with all routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/dataset/load", post(handlers::load_dataset))
        .route("/api/assess", post(handlers::assess))
        .route("/api/assess/cancel", post(handlers::cancel_assessment))
        .route("/api/history", get(handlers::get_history))
        .route(
            "/api/history/:id/export",
            get(handlers::export_history_entry),
        )
        .route("/api/session", delete(handlers::clear_session))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
