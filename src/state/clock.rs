//! Local time source and the one-shot reference correction

use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

/// Source of raw local time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock of the host
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Offset between the reference authority and the local clock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockState {
    pub offset_millis: i64,
}

impl ClockState {
    pub fn new(offset_millis: i64) -> Self {
        Self { offset_millis }
    }

    /// Offset measured from a reference reading taken at `local`
    pub fn from_reference(reference: DateTime<Utc>, local: DateTime<Utc>) -> Self {
        Self::new((reference - local).num_milliseconds())
    }
}

/// Local clock plus the correction established at startup.
///
/// The offset can be set exactly once; readers that run before the sync
/// completes see an offset of zero.
pub struct CorrectedClock {
    source: Arc<dyn Clock>,
    state: OnceLock<ClockState>,
}

impl CorrectedClock {
    pub fn new(source: Arc<dyn Clock>) -> Self {
        Self {
            source,
            state: OnceLock::new(),
        }
    }

    /// Store the correction. Later calls are ignored.
    pub fn set_state(&self, state: ClockState) {
        if self.state.set(state).is_err() {
            warn!("Clock offset already established, ignoring {}ms", state.offset_millis);
        }
    }

    pub fn state(&self) -> ClockState {
        self.state.get().copied().unwrap_or_default()
    }

    /// Uncorrected local time
    pub fn raw_now(&self) -> DateTime<Utc> {
        self.source.now()
    }

    /// Local time adjusted by the reference offset
    pub fn now(&self) -> DateTime<Utc> {
        self.corrected(self.raw_now())
    }

    /// Apply the offset to a raw reading
    pub fn corrected(&self, raw: DateTime<Utc>) -> DateTime<Utc> {
        raw + Duration::milliseconds(self.state().offset_millis)
    }
}

impl std::fmt::Debug for CorrectedClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorrectedClock")
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Clock frozen at one instant
    #[derive(Debug, Clone, Copy)]
    pub struct FixedClock(DateTime<Utc>);

    impl FixedClock {
        pub fn new(now: DateTime<Utc>) -> Self {
            Self(now)
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FixedClock;
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn uncorrected_until_state_is_set() {
        let local = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let clock = CorrectedClock::new(Arc::new(FixedClock::new(local)));
        assert_eq!(clock.now(), local);

        clock.set_state(ClockState::new(1500));
        assert_eq!(clock.now(), local + Duration::milliseconds(1500));
        assert_eq!(clock.raw_now(), local);
    }

    #[test]
    fn offset_is_set_once() {
        let local = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let clock = CorrectedClock::new(Arc::new(FixedClock::new(local)));
        clock.set_state(ClockState::new(-200));
        clock.set_state(ClockState::new(9000));
        assert_eq!(clock.state().offset_millis, -200);
    }

    #[test]
    fn offset_from_reference_reading() {
        let local = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let reference = local + Duration::seconds(3);
        assert_eq!(ClockState::from_reference(reference, local).offset_millis, 3000);
    }
}
