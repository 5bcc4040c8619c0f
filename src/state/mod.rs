//! State management module
//!
//! Timer model, the canonical timer set, the corrected clock and the
//! engine context shared by the background tasks.

pub mod app_state;
pub mod clock;
pub mod engine_state;
pub mod timer;
pub mod timer_set;

// Re-export main types
pub use app_state::{AppState, EngineTiming};
pub use clock::{Clock, ClockState, CorrectedClock, SystemClock};
pub use engine_state::{EngineState, SyncStatus};
pub use timer::{sort_for_display, TimerDefinition, TimerInstance, TimerKind, START_TIMER_ID};
pub use timer_set::{ApplyOutcome, Fingerprint, TimerSet};
