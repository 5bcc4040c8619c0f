//! Fast periodic countdown refresh and finish-transition handling

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, FixedOffset, Utc};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::{
    render::{
        board::{FADING_CLASS, FINISHED_CLASS},
        format::{ceil_seconds, format_hms, ZERO_DURATION},
        RenderTarget,
    },
    state::{AppState, EngineState, TimerKind},
};

/// Inputs of one tick
pub struct TickContext<'a> {
    /// Corrected time
    pub now: DateTime<Utc>,
    /// Uncorrected time, used for the refresh countdown
    pub raw_now: DateTime<Utc>,
    pub zone: &'a FixedOffset,
    pub fade: Duration,
    pub renderer: &'a dyn RenderTarget,
}

/// Timers that finished during one tick
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub finished: Vec<String>,
}

/// Recompute every countdown once.
///
/// A pending timer whose target has been reached is flipped to finished,
/// notified and restyled exactly once. When a regular timer finished the list
/// is put back into display order with an in-place reorder.
pub fn run_tick(engine: &mut EngineState, ctx: &TickContext<'_>) -> TickReport {
    let clock_text = ctx.now.with_timezone(ctx.zone).format("%H:%M:%S").to_string();
    ctx.renderer.set_clock(&clock_text);

    let refresh_seconds = engine
        .next_fetch_at
        .map(|at| ceil_seconds((at - ctx.raw_now).num_milliseconds()))
        .unwrap_or(0);
    ctx.renderer.set_refresh_countdown(refresh_seconds);

    let mut report = TickReport::default();
    let mut normal_finished = false;
    let EngineState { timers, notifier, .. } = engine;

    for timer in timers.timers_mut().iter_mut().filter(|t| !t.is_finished()) {
        let remaining = timer.remaining_millis(ctx.now);
        if remaining > 0 {
            ctx.renderer.update_text(&timer.id, &format_hms(ceil_seconds(remaining)));
            continue;
        }

        if !timer.finish() {
            continue;
        }
        notifier.notify();

        match timer.kind {
            TimerKind::Start => {
                ctx.renderer.set_class(&timer.id, FADING_CLASS, true);
                ctx.renderer.remove_after_delay(&timer.id, ctx.fade);
            }
            TimerKind::Normal => {
                ctx.renderer.set_class(&timer.id, FINISHED_CLASS, true);
                ctx.renderer.update_text(&timer.id, ZERO_DURATION);
                normal_finished = true;
            }
        }
        report.finished.push(timer.id.clone());
    }

    // The start card is on its way out and keeps its place while fading
    if normal_finished {
        timers.sort_for_display();
        ctx.renderer.reorder(&timers.ids());
    }

    report
}

/// Run one tick against the shared state
pub fn tick(state: &AppState) -> Result<TickReport, String> {
    let raw_now = state.clock.raw_now();
    let ctx = TickContext {
        now: state.clock.corrected(raw_now),
        raw_now,
        zone: &state.schedule.zone,
        fade: state.timing.fade,
        renderer: state.renderer.as_ref(),
    };
    state.with_engine(|engine| run_tick(engine, &ctx))
}

/// Background task driving the countdown display
pub async fn tick_task(state: Arc<AppState>) {
    info!("Starting tick task every {:?}", state.timing.tick_interval);

    let mut ticker = interval(state.timing.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        match tick(&state) {
            Ok(report) if !report.finished.is_empty() => {
                info!("Timers finished: {:?}", report.finished);
            }
            Ok(_) => {}
            Err(e) => {
                error!("Tick skipped: {}", e);
            }
        }
    }
}
