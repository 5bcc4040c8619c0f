//! Canonical timer list with fingerprint-based change detection

use super::timer::{sort_for_display, TimerInstance};

/// Deterministic summary of a timer list over its `(label, target)` pairs.
///
/// Pairs are taken in target order so the display order, which moves as
/// timers finish, does not affect the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(timers: &[TimerInstance]) -> Self {
        let mut pairs: Vec<(i64, &str)> = timers
            .iter()
            .map(|t| (t.target.timestamp_millis(), t.label.as_str()))
            .collect();
        pairs.sort_unstable();
        // Serializing plain tuples cannot fail
        Self(serde_json::to_string(&pairs).unwrap_or_default())
    }
}

/// Result of offering a freshly computed list to the set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Same fingerprint, existing list kept
    Unchanged,
    /// List replaced, the display must be rebuilt
    Replaced,
}

#[derive(Debug, Default)]
pub struct TimerSet {
    timers: Vec<TimerInstance>,
    fingerprint: Option<Fingerprint>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in `incoming` unless it matches the current fingerprint.
    pub fn apply(&mut self, incoming: Vec<TimerInstance>) -> ApplyOutcome {
        let fingerprint = Fingerprint::of(&incoming);
        if self.fingerprint.as_ref() == Some(&fingerprint) {
            return ApplyOutcome::Unchanged;
        }
        self.timers = incoming;
        self.fingerprint = Some(fingerprint);
        ApplyOutcome::Replaced
    }

    pub fn timers(&self) -> &[TimerInstance] {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut [TimerInstance] {
        &mut self.timers
    }

    /// Re-establish display order in place
    pub fn sort_for_display(&mut self) {
        sort_for_display(&mut self.timers);
    }

    pub fn ids(&self) -> Vec<String> {
        self.timers.iter().map(|t| t.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
