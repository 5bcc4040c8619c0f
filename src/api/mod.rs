//! HTTP API module
//!
//! Serves the rendered board and receives the operator's controls.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{render::BoardRenderer, state::AppState};
use handlers::*;

/// State shared by the handlers
#[derive(Debug, Clone)]
pub struct ApiContext {
    pub app: Arc<AppState>,
    pub board: Arc<BoardRenderer>,
}

/// Create the HTTP router with all endpoints
pub fn create_router(context: ApiContext) -> Router {
    Router::new()
        .route("/board", get(board_handler))
        .route("/interaction", post(interaction_handler))
        .route("/audio/toggle", post(audio_toggle_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(context)
}
