//! API Module
//!
//! HTTP surface of the transfer service. Each submodule handles
//! endpoints for a specific domain.

pub mod download;
pub mod error;
pub mod events;
pub mod health;
pub mod upload;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // File transfer endpoints
        .route("/upload", post(upload::upload_files))
        .route("/download/{filename}", get(download::download_file))
        // Pipeline event channel
        .route("/ws", get(events::ws_handler))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(body_limit)
}
