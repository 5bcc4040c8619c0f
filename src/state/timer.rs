//! Timer definitions and the instances derived from them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Id of the pseudo-timer counting down to the base hour itself
pub const START_TIMER_ID: &str = "start-timer";

/// Raw timer entry as delivered by the schedule backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerDefinition {
    pub label: String,
    /// Minutes after the base hour
    #[serde(rename = "minutes")]
    pub minutes_offset: i64,
}

/// Whether an instance is the base-hour pseudo-timer or a regular entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerKind {
    Start,
    Normal,
}

/// A concrete countdown with an absolute target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerInstance {
    pub id: String,
    pub label: String,
    pub target: DateTime<Utc>,
    pub kind: TimerKind,
    is_finished: bool,
}

impl TimerInstance {
    pub fn start(label: impl Into<String>, target: DateTime<Utc>) -> Self {
        Self {
            id: START_TIMER_ID.to_string(),
            label: label.into(),
            target,
            kind: TimerKind::Start,
            is_finished: false,
        }
    }

    /// Regular instance; `finished` is set when the target already lies in the past
    pub fn normal(index: usize, label: impl Into<String>, target: DateTime<Utc>, finished: bool) -> Self {
        Self {
            id: format!("timer-{}", index),
            label: label.into(),
            target,
            kind: TimerKind::Normal,
            is_finished: finished,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.is_finished
    }

    /// Flip to finished. Returns true only for the call that performed the transition.
    pub fn finish(&mut self) -> bool {
        if self.is_finished {
            return false;
        }
        self.is_finished = true;
        true
    }

    /// Milliseconds left until the target, negative once it has passed
    pub fn remaining_millis(&self, now: DateTime<Utc>) -> i64 {
        (self.target - now).num_milliseconds()
    }
}

/// Sort unfinished before finished, then by ascending target
pub fn sort_for_display(timers: &mut [TimerInstance]) {
    timers.sort_by(|a, b| {
        a.is_finished
            .cmp(&b.is_finished)
            .then_with(|| a.target.cmp(&b.target))
    });
}
