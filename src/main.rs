//! Countdown Board - recurring countdown timers for an unattended display
//!
//! This is the main entry point for the countdown-board application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use countdown_board::{
    api::{create_router, ApiContext},
    config::Config,
    render::BoardRenderer,
    services::{synchronize_clock, HttpScheduleSource, HttpTimeReference, NotificationSink, ScheduleSource, TerminalBellFactory},
    state::{AppState, CorrectedClock, EngineState, SystemClock},
    tasks::{schedule_sync_task, tick_task},
    utils::shutdown_signal,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_board={},tower_http=info", config.log_level()))
        .init();

    info!("Starting countdown-board v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: schedule={}, base_hour={}, utc_offset={}min, fetch={}ms, tick={}ms",
        config.schedule_url, config.base_hour, config.utc_offset_minutes,
        config.fetch_interval_ms, config.tick_interval_ms
    );

    let client = reqwest::Client::builder()
        .user_agent(concat!("countdown-board/", env!("CARGO_PKG_VERSION")))
        .timeout(config.request_timeout()?)
        .build()?;

    let board = Arc::new(BoardRenderer::new());
    let notifier = NotificationSink::new(Box::new(TerminalBellFactory), !config.muted);

    // Create the engine context
    let state = Arc::new(AppState::new(
        EngineState::new(notifier),
        CorrectedClock::new(Arc::new(SystemClock)),
        board.clone(),
        config.schedule_settings()?,
        config.timing()?,
    ));

    // The display runs from local time while the reference request is pending
    tokio::spawn(tick_task(Arc::clone(&state)));

    let reference = HttpTimeReference::new(client.clone(), config.time_url.clone(), config.zone()?);
    let source: Arc<dyn ScheduleSource> = Arc::new(HttpScheduleSource::new(client, config.schedule_url.clone()));
    let sync_state = Arc::clone(&state);
    tokio::spawn(async move {
        synchronize_clock(&reference, &sync_state.clock).await;
        schedule_sync_task(sync_state, source).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(ApiContext {
        app: Arc::clone(&state),
        board,
    });

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Display API running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /board        - Rendered board");
    info!("  POST /interaction  - User gesture, activates audio");
    info!("  POST /audio/toggle - Toggle audio cues");
    info!("  GET  /health       - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Shutdown complete");
    Ok(())
}
