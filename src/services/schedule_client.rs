//! Retrieval of the timer schedule from the backend

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{error::SyncError, state::TimerDefinition};

/// Schedule payload after defensive defaults have been applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulePayload {
    pub delay_seconds: u32,
    pub timers: Vec<TimerDefinition>,
}

/// Anything that can deliver the current schedule
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    async fn fetch(&self) -> Result<SchedulePayload, SyncError>;
}

/// Pulls the schedule with a plain GET
pub struct HttpScheduleSource {
    client: reqwest::Client,
    url: String,
}

impl HttpScheduleSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ScheduleSource for HttpScheduleSource {
    async fn fetch(&self) -> Result<SchedulePayload, SyncError> {
        debug!("Fetching schedule from {}", self.url);

        let resp = self.client.get(&self.url).send().await?;

        if !resp.status().is_success() {
            return Err(SyncError::Status(resp.status().as_u16()));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| SyncError::Malformed(e.to_string()))?;

        parse_payload(&body)
    }
}

/// Interpret a schedule body.
///
/// Only a non-object body is rejected. A missing or non-numeric delay
/// becomes 0, a missing or non-array timer list becomes empty, and timer
/// entries without a usable minute offset are dropped.
pub fn parse_payload(body: &Value) -> Result<SchedulePayload, SyncError> {
    let object = body
        .as_object()
        .ok_or_else(|| SyncError::Malformed("expected a JSON object".to_string()))?;

    let delay_seconds = match object.get("delaySeconds").and_then(lenient_integer) {
        Some(delay) if delay < 0 => {
            warn!("Negative delay {}s in schedule, using 0", delay);
            0
        }
        Some(delay) => u32::try_from(delay).unwrap_or(u32::MAX),
        None => 0,
    };

    let timers = match object.get("timers").and_then(Value::as_array) {
        Some(entries) => entries.iter().filter_map(parse_definition).collect(),
        None => Vec::new(),
    };

    Ok(SchedulePayload {
        delay_seconds,
        timers,
    })
}

fn parse_definition(entry: &Value) -> Option<TimerDefinition> {
    let label = match entry.get("label") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    match entry.get("minutes").and_then(lenient_integer) {
        Some(minutes_offset) => Some(TimerDefinition {
            label,
            minutes_offset,
        }),
        None => {
            warn!("Skipping timer {:?} without a valid minute offset", label);
            None
        }
    }
}

/// Integer from a JSON number or numeric string; fractions are truncated
fn lenient_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}
