//! API Route Configuration

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use super::handlers::{self, AppState};
use super::middleware::{access_guard, logging_middleware};
use crate::models::types::SequenceMode;

/// JSON bodies above this size are rejected
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Create the API router with all routes and middleware.
///
/// Unmatched paths are served from `public_dir`, falling back to its
/// `index.html` so the frontend can handle its own routes.
pub fn create_router(state: Arc<AppState>, public_dir: &Path) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let labels = match state.registry.mode() {
        SequenceMode::Stored => get(handlers::list_labels).delete(handlers::delete_all_labels),
        SequenceMode::Derived => get(handlers::list_labels),
    };

    let api = Router::new()
        .route("/state", get(handlers::get_state).patch(handlers::patch_state))
        .route("/labels", labels)
        .route("/labels/generate", post(handlers::generate_labels))
        .route(
            "/labels/:id",
            put(handlers::update_label).delete(handlers::delete_label),
        );

    let frontend = ServeDir::new(public_dir).fallback(ServeFile::new(public_dir.join("index.html")));

    Router::new()
        .nest("/api", api)
        .route("/health", get(handlers::health_check))
        .fallback_service(frontend)
        .with_state(state.clone())
        // Middleware (order matters - bottom runs first)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn_with_state(state, access_guard))
}
