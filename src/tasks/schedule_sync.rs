//! Periodic schedule refresh

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use chrono::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::{
    error::SyncError,
    schedule::compute_instances,
    services::ScheduleSource,
    state::{AppState, ApplyOutcome, SyncStatus},
};

/// Fetch the schedule once and reconcile it into the engine.
///
/// On failure the timer list is left untouched; only the status and the
/// warning change.
pub async fn refresh_schedule(
    state: &AppState,
    source: &dyn ScheduleSource,
) -> Result<ApplyOutcome, SyncError> {
    state.set_status(SyncStatus::Syncing).map_err(SyncError::State)?;

    let payload = match source.fetch().await {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Schedule fetch failed, keeping {} timers: {}", timer_count(state), e);
            state.set_status(SyncStatus::Offline).map_err(SyncError::State)?;
            state.renderer.set_warning(true);
            return Err(e);
        }
    };

    let now = state.clock.now();
    let global = state.schedule.global(payload.delay_seconds);
    let instances = compute_instances(&state.schedule, global, &payload.timers, now);
    debug!(
        "Schedule has {} definitions, delay {}s, {} instances",
        payload.timers.len(),
        payload.delay_seconds,
        instances.len()
    );

    let outcome = state
        .with_engine(|engine| {
            engine.delay_seconds = payload.delay_seconds;
            engine.status = SyncStatus::Active;
            let outcome = engine.timers.apply(instances);
            if outcome == ApplyOutcome::Replaced {
                state.renderer.replace_all(engine.timers.timers());
            }
            outcome
        })
        .map_err(SyncError::State)?;

    state.renderer.set_warning(false);
    state.renderer.set_delay(payload.delay_seconds);
    state.renderer.set_status(SyncStatus::Active);

    if outcome == ApplyOutcome::Replaced {
        info!("Schedule changed, display rebuilt");
    }
    Ok(outcome)
}

fn timer_count(state: &AppState) -> usize {
    state.with_engine(|engine| engine.timers.len()).unwrap_or(0)
}

async fn refresh_and_log(state: &AppState, source: &dyn ScheduleSource) {
    match refresh_schedule(state, source).await {
        Ok(outcome) => debug!("Schedule refresh done: {:?}", outcome),
        Err(SyncError::State(e)) => error!("Schedule refresh aborted: {}", e),
        Err(_) => {}
    }
}

/// Background task refreshing the schedule on a fixed cadence.
///
/// The first fetch is awaited; later ones are spawned so a slow request
/// never shifts the cadence. At most one spawned fetch runs at a time: a
/// cycle that finds the previous request still pending is skipped.
pub async fn schedule_sync_task(state: Arc<AppState>, source: Arc<dyn ScheduleSource>) {
    let period = state.timing.fetch_interval;
    info!("Starting schedule sync task every {:?}", period);

    refresh_and_log(&state, source.as_ref()).await;

    let step = Duration::from_std(period).unwrap_or_else(|_| Duration::zero());
    let in_flight = Arc::new(AtomicBool::new(false));
    loop {
        let next = state.clock.raw_now() + step;
        if let Err(e) = state.with_engine(|engine| engine.next_fetch_at = Some(next)) {
            error!("Failed to record next fetch time: {}", e);
        }

        sleep(period).await;

        if in_flight.swap(true, Ordering::AcqRel) {
            debug!("Previous schedule fetch still pending, skipping this cycle");
            continue;
        }

        let state = Arc::clone(&state);
        let source = Arc::clone(&source);
        let in_flight = Arc::clone(&in_flight);
        tokio::spawn(async move {
            refresh_and_log(&state, source.as_ref()).await;
            in_flight.store(false, Ordering::Release);
        });
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{atomic::AtomicUsize, Mutex},
        time::Duration as StdDuration,
    };

    use async_trait::async_trait;
    use chrono::{FixedOffset, TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::{
        render::target::testing::{RecordingTarget, RenderCall},
        schedule::ScheduleSettings,
        services::{notification::testing::CountingAudio, parse_payload, SchedulePayload},
        state::{clock::testing::FixedClock, CorrectedClock, EngineState, EngineTiming, TimerDefinition},
    };

    /// Hands out queued responses in order
    struct ScriptedSource(Mutex<Vec<Result<SchedulePayload, SyncError>>>);

    impl ScriptedSource {
        fn new(mut responses: Vec<Result<SchedulePayload, SyncError>>) -> Self {
            responses.reverse();
            Self(Mutex::new(responses))
        }
    }

    #[async_trait]
    impl ScheduleSource for ScriptedSource {
        async fn fetch(&self) -> Result<SchedulePayload, SyncError> {
            self.0
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(SyncError::Malformed("script exhausted".to_string())))
        }
    }

    /// Answers the first request, then never completes
    #[derive(Default)]
    struct StallingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ScheduleSource for StallingSource {
        async fn fetch(&self) -> Result<SchedulePayload, SyncError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Ok(payload(5));
            }
            std::future::pending().await
        }
    }

    fn payload(minutes: i64) -> SchedulePayload {
        SchedulePayload {
            delay_seconds: 10,
            timers: vec![TimerDefinition { label: "A".to_string(), minutes_offset: minutes }],
        }
    }

    fn app(target: Arc<RecordingTarget>) -> AppState {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 20, 59, 0).unwrap();
        AppState::new(
            EngineState::new(CountingAudio::default().sink(true)),
            CorrectedClock::new(Arc::new(FixedClock::new(now))),
            target,
            ScheduleSettings {
                base_hour: 21,
                zone: FixedOffset::east_opt(0).unwrap(),
                start_label: "start".to_string(),
            },
            EngineTiming::default(),
        )
    }

    #[tokio::test]
    async fn unchanged_schedule_does_not_rebuild() {
        let target = Arc::new(RecordingTarget::default());
        let state = app(Arc::clone(&target));
        let source = ScriptedSource::new(vec![Ok(payload(5)), Ok(payload(5))]);

        assert_eq!(refresh_schedule(&state, &source).await.unwrap(), ApplyOutcome::Replaced);
        assert_eq!(refresh_schedule(&state, &source).await.unwrap(), ApplyOutcome::Unchanged);
        assert_eq!(target.count(|c| matches!(c, RenderCall::ReplaceAll(_))), 1);
    }

    #[tokio::test]
    async fn changed_schedule_rebuilds() {
        let target = Arc::new(RecordingTarget::default());
        let state = app(Arc::clone(&target));
        let source = ScriptedSource::new(vec![Ok(payload(5)), Ok(payload(6))]);

        refresh_schedule(&state, &source).await.unwrap();
        refresh_schedule(&state, &source).await.unwrap();
        assert_eq!(target.count(|c| matches!(c, RenderCall::ReplaceAll(_))), 2);
    }

    #[tokio::test]
    async fn failure_keeps_timers_and_goes_offline() {
        let target = Arc::new(RecordingTarget::default());
        let state = app(Arc::clone(&target));
        let source = ScriptedSource::new(vec![Ok(payload(5)), Err(SyncError::Status(500))]);

        refresh_schedule(&state, &source).await.unwrap();
        let before = state.with_engine(|e| e.timers.timers().to_vec()).unwrap();
        target.clear();

        assert!(matches!(
            refresh_schedule(&state, &source).await,
            Err(SyncError::Status(500))
        ));
        let after = state.with_engine(|e| e.timers.timers().to_vec()).unwrap();
        assert_eq!(before, after);
        assert_eq!(state.with_engine(|e| e.status).unwrap(), SyncStatus::Offline);
        assert_eq!(
            target.calls(),
            vec![
                RenderCall::Status(SyncStatus::Syncing),
                RenderCall::Status(SyncStatus::Offline),
                RenderCall::Warning(true),
            ]
        );
    }

    #[tokio::test]
    async fn recovery_clears_warning() {
        let target = Arc::new(RecordingTarget::default());
        let state = app(Arc::clone(&target));
        let source = ScriptedSource::new(vec![Err(SyncError::Status(503)), Ok(payload(5))]);

        let _ = refresh_schedule(&state, &source).await;
        target.clear();
        refresh_schedule(&state, &source).await.unwrap();

        let calls = target.calls();
        assert!(calls.contains(&RenderCall::Warning(false)));
        assert!(calls.contains(&RenderCall::Delay(10)));
        assert_eq!(calls.last(), Some(&RenderCall::Status(SyncStatus::Active)));
        assert_eq!(state.with_engine(|e| e.delay_seconds).unwrap(), 10);
    }

    #[tokio::test]
    async fn out_of_range_minutes_are_skipped() {
        let target = Arc::new(RecordingTarget::default());
        let state = app(Arc::clone(&target));
        let oversized = parse_payload(&json!({
            "delaySeconds": 10,
            "timers": [
                { "label": "X", "minutes": 1e15 },
                { "label": "Y", "minutes": 1_000_000_000_000i64 },
                { "label": "A", "minutes": 5 }
            ]
        }))
        .unwrap();
        let source = ScriptedSource::new(vec![Ok(oversized)]);

        assert_eq!(refresh_schedule(&state, &source).await.unwrap(), ApplyOutcome::Replaced);
        let labels: Vec<String> = state
            .with_engine(|e| e.timers.timers().iter().map(|t| t.label.clone()).collect())
            .unwrap();
        assert_eq!(labels, vec!["start".to_string(), "A".to_string()]);
        assert_eq!(state.with_engine(|e| e.status).unwrap(), SyncStatus::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_fetch_is_not_stacked() {
        let target = Arc::new(RecordingTarget::default());
        let state = Arc::new(app(target));
        let source = Arc::new(StallingSource::default());

        let task = tokio::spawn(schedule_sync_task(
            Arc::clone(&state),
            Arc::clone(&source) as Arc<dyn ScheduleSource>,
        ));
        tokio::time::sleep(StdDuration::from_millis(5000 * 6 + 100)).await;

        // first fetch plus the one that never returns
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        task.abort();
    }
}
