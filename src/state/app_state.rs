//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use tracing::info;

use super::{CorrectedClock, EngineState, SyncStatus};
use crate::{render::RenderTarget, schedule::ScheduleSettings};

/// Cadence of the background activities
#[derive(Debug, Clone, Copy)]
pub struct EngineTiming {
    pub fetch_interval: Duration,
    pub tick_interval: Duration,
    /// How long a finished start card fades before removal
    pub fade: Duration,
}

impl Default for EngineTiming {
    fn default() -> Self {
        Self {
            fetch_interval: Duration::from_millis(5000),
            tick_interval: Duration::from_millis(100),
            fade: Duration::from_millis(600),
        }
    }
}

/// Owned context handed to every task and handler
pub struct AppState {
    /// Timer list, sync status and audio state
    pub engine: Mutex<EngineState>,
    pub clock: CorrectedClock,
    pub renderer: Arc<dyn RenderTarget>,
    pub schedule: ScheduleSettings,
    pub timing: EngineTiming,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        engine: EngineState,
        clock: CorrectedClock,
        renderer: Arc<dyn RenderTarget>,
        schedule: ScheduleSettings,
        timing: EngineTiming,
    ) -> Self {
        Self {
            engine: Mutex::new(engine),
            clock,
            renderer,
            schedule,
            timing,
            start_time: Instant::now(),
        }
    }

    /// Run `f` with exclusive access to the engine state
    pub fn with_engine<F, R>(&self, f: F) -> Result<R, String>
    where
        F: FnOnce(&mut EngineState) -> R,
    {
        let mut engine = self
            .engine
            .lock()
            .map_err(|e| format!("Failed to lock engine state: {}", e))?;
        Ok(f(&mut *engine))
    }

    /// Record and display a new sync status
    pub fn set_status(&self, status: SyncStatus) -> Result<(), String> {
        self.with_engine(|engine| engine.status = status)?;
        self.renderer.set_status(status);
        Ok(())
    }

    /// Register a user gesture so audio output may be constructed
    pub fn activate_audio(&self) -> Result<bool, String> {
        self.with_engine(|engine| {
            engine.notifier.activate();
            engine.notifier.is_activated()
        })
    }

    /// Flip audio on or off; returns the new state
    pub fn toggle_audio(&self) -> Result<bool, String> {
        let enabled = self.with_engine(|engine| engine.notifier.toggle())?;
        info!("Audio toggled, now {}", if enabled { "on" } else { "off" });
        Ok(enabled)
    }

    pub fn audio_enabled(&self) -> Result<bool, String> {
        self.with_engine(|engine| engine.audio_enabled())
    }

    /// Calculate uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("clock", &self.clock)
            .field("schedule", &self.schedule)
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}
