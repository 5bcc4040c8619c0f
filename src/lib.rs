//! Countdown Board - recurring countdown timers kept in sync with a schedule backend
//!
//! This library provides the clock correction, the periodic schedule
//! refresh, the tick-driven countdown engine and an in-memory render
//! target served over a small HTTP API.

pub mod api;
pub mod config;
pub mod error;
pub mod render;
pub mod schedule;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::{create_router, ApiContext};
pub use config::Config;
pub use error::{AudioError, SyncError};
pub use render::{BoardRenderer, RenderTarget};
pub use state::AppState;
pub use utils::signals::shutdown_signal;
