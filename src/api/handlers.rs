//! HTTP endpoint handlers

use axum::{extract::State, http::StatusCode, response::Json};
use tracing::{debug, error};

use super::{
    responses::{AudioResponse, BoardResponse, HealthResponse},
    ApiContext,
};

/// Handle GET /board - Return the rendered surface
pub async fn board_handler(State(ctx): State<ApiContext>) -> Result<Json<BoardResponse>, StatusCode> {
    let board = ctx.board.snapshot().map_err(|e| {
        error!("Failed to snapshot board: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let audio_enabled = ctx.app.audio_enabled().map_err(|e| {
        error!("Failed to read audio state: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(BoardResponse {
        board,
        audio_enabled,
        clock_offset_ms: ctx.app.clock.state().offset_millis,
    }))
}

/// Handle POST /interaction - A user gesture on the display
pub async fn interaction_handler(State(ctx): State<ApiContext>) -> Result<Json<AudioResponse>, StatusCode> {
    let activated = ctx.app.activate_audio().map_err(|e| {
        error!("Failed to activate audio: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let enabled = ctx.app.audio_enabled().map_err(|e| {
        error!("Failed to read audio state: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    debug!("Interaction received, audio activated={}", activated);
    Ok(Json(AudioResponse::new(enabled, activated)))
}

/// Handle POST /audio/toggle - Flip audio cues on or off
pub async fn audio_toggle_handler(State(ctx): State<ApiContext>) -> Result<Json<AudioResponse>, StatusCode> {
    match ctx.app.toggle_audio() {
        Ok(enabled) => {
            let activated = ctx.app.with_engine(|e| e.notifier.is_activated()).unwrap_or(false);
            Ok(Json(AudioResponse::new(enabled, activated)))
        }
        Err(e) => {
            error!("Failed to toggle audio: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(ctx.app.get_uptime()))
}
