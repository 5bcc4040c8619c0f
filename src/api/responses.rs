//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::render::BoardSnapshot;

/// Rendered board plus engine-side flags
#[derive(Debug, Clone, Serialize)]
pub struct BoardResponse {
    #[serde(flatten)]
    pub board: BoardSnapshot,
    pub audio_enabled: bool,
    pub clock_offset_ms: i64,
}

/// Result of an audio control request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioResponse {
    pub audio_enabled: bool,
    pub audio_activated: bool,
    pub timestamp: DateTime<Utc>,
}

impl AudioResponse {
    pub fn new(audio_enabled: bool, audio_activated: bool) -> Self {
        Self {
            audio_enabled,
            audio_activated,
            timestamp: Utc::now(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok(uptime: String) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime,
        }
    }
}
