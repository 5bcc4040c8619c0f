//! The render capability the engine draws through

use std::time::Duration;

use crate::state::{SyncStatus, TimerInstance};

/// UI sink consumed by the engine.
///
/// Card operations address cards by timer id; unknown ids are ignored.
pub trait RenderTarget: Send + Sync {
    /// Drop every card and build fresh ones for `instances`, in order
    fn replace_all(&self, instances: &[TimerInstance]);
    fn update_text(&self, id: &str, text: &str);
    fn set_class(&self, id: &str, class: &str, active: bool);
    fn remove_after_delay(&self, id: &str, delay: Duration);
    /// Move existing cards into the given order without rebuilding them
    fn reorder(&self, ids_in_order: &[String]);

    fn set_status(&self, status: SyncStatus);
    fn set_delay(&self, delay_seconds: u32);
    fn set_clock(&self, text: &str);
    fn set_refresh_countdown(&self, seconds: i64);
    fn set_warning(&self, visible: bool);
}
