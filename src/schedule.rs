//! Derivation of concrete countdown targets from the daily schedule

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use tracing::warn;

use crate::state::{TimerDefinition, TimerInstance, sort_for_display};

/// Locally configured part of the schedule
#[derive(Debug, Clone)]
pub struct ScheduleSettings {
    /// Hour of day (0-23) all targets are anchored to
    pub base_hour: u32,
    /// Zone in which "today" and the base hour are evaluated
    pub zone: FixedOffset,
    /// Label of the pseudo-timer counting down to the base hour
    pub start_label: String,
}

impl ScheduleSettings {
    /// Combine the local base hour with a delay from the backend
    pub fn global(&self, delay_seconds: u32) -> GlobalScheduleConfig {
        GlobalScheduleConfig {
            base_hour: self.base_hour,
            delay_seconds,
        }
    }
}

/// Base hour plus the backend-supplied delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalScheduleConfig {
    pub base_hour: u32,
    pub delay_seconds: u32,
}

/// Today's base-hour instant, "today" taken from `now` in `zone`
pub fn base_instant(base_hour: u32, zone: &FixedOffset, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let local_date = now.with_timezone(zone).date_naive();
    let naive = local_date.and_hms_opt(base_hour, 0, 0)?;
    zone.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Build the full instance list for one fetch cycle.
///
/// The start pseudo-timer is only included while its target is still ahead
/// of `now`. Regular targets stay anchored to today and come out already
/// finished when they lie in the past. Entries whose target falls outside
/// the representable date range are skipped. The result is in display order.
pub fn compute_instances(
    settings: &ScheduleSettings,
    global: GlobalScheduleConfig,
    definitions: &[TimerDefinition],
    now: DateTime<Utc>,
) -> Vec<TimerInstance> {
    let Some(base) = base_instant(global.base_hour, &settings.zone, now) else {
        warn!("Base hour {} is not representable, no timers derived", global.base_hour);
        return Vec::new();
    };
    let delay = Duration::seconds(i64::from(global.delay_seconds));

    let mut instances = Vec::with_capacity(definitions.len() + 1);

    match base.checked_add_signed(delay) {
        Some(start_target) if start_target > now => {
            instances.push(TimerInstance::start(settings.start_label.clone(), start_target));
        }
        Some(_) => {}
        None => warn!("Start target out of range for delay {}s", global.delay_seconds),
    }

    for (index, definition) in definitions.iter().enumerate() {
        let Some(target) = normal_target(base, definition.minutes_offset, delay) else {
            warn!(
                "Skipping timer {:?}: {} minutes is out of range",
                definition.label, definition.minutes_offset
            );
            continue;
        };
        instances.push(TimerInstance::normal(
            index,
            definition.label.clone(),
            target,
            target <= now,
        ));
    }

    sort_for_display(&mut instances);
    instances
}

/// `base + (minutes + 1) min + delay`, or `None` on overflow
fn normal_target(base: DateTime<Utc>, minutes_offset: i64, delay: Duration) -> Option<DateTime<Utc>> {
    let offset = minutes_offset.checked_add(1).and_then(Duration::try_minutes)?;
    base.checked_add_signed(offset)?.checked_add_signed(delay)
}
