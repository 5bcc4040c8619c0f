//! Background tasks module
//!
//! The schedule refresh loop and the countdown tick, both running on the
//! same runtime as the display API.

pub mod schedule_sync;
pub mod tick_engine;

// Re-export main functions
pub use schedule_sync::{refresh_schedule, schedule_sync_task};
pub use tick_engine::{run_tick, tick, tick_task, TickContext, TickReport};
