//! Error types for the upstream requests and the audio output

use thiserror::Error;

/// Failure talking to the schedule backend or the time reference
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("engine state unavailable: {0}")]
    State(String),
}

/// Failure constructing or driving the audio output
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio output unavailable: {0}")]
    Unavailable(String),

    #[error("cue playback failed: {0}")]
    Playback(#[from] std::io::Error),
}
