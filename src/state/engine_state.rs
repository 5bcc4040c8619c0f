//! Mutable engine context shared by the fetch loop and the tick

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::timer_set::TimerSet;
use crate::services::NotificationSink;

/// Connection state of the schedule refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Syncing,
    Active,
    Offline,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syncing => write!(f, "SYNCING"),
            Self::Active => write!(f, "ACTIVE"),
            Self::Offline => write!(f, "OFFLINE"),
        }
    }
}

#[derive(Debug)]
pub struct EngineState {
    pub timers: TimerSet,
    /// Raw local time of the next scheduled fetch
    pub next_fetch_at: Option<DateTime<Utc>>,
    pub status: SyncStatus,
    /// Delay applied by the last successful fetch
    pub delay_seconds: u32,
    pub notifier: NotificationSink,
}

impl EngineState {
    pub fn new(notifier: NotificationSink) -> Self {
        Self {
            timers: TimerSet::new(),
            next_fetch_at: None,
            status: SyncStatus::Syncing,
            delay_seconds: 0,
            notifier,
        }
    }

    pub fn audio_enabled(&self) -> bool {
        self.notifier.is_enabled()
    }
}
