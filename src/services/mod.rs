//! External collaborators module
//!
//! This module contains the clients for the schedule backend and the time
//! authority, plus the audio notification sink.

pub mod clock_sync;
pub mod notification;
pub mod schedule_client;

// Re-export main types
pub use clock_sync::{synchronize_clock, HttpTimeReference, TimeReference};
pub use notification::{AudioFactory, AudioOutput, NotificationSink, TerminalBell, TerminalBellFactory};
pub use schedule_client::{parse_payload, HttpScheduleSource, SchedulePayload, ScheduleSource};
