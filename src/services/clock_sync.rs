//! One-shot correction of the local clock against a time authority

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    error::SyncError,
    state::{ClockState, CorrectedClock},
};

/// Authority that reports the current time
#[async_trait]
pub trait TimeReference: Send + Sync {
    async fn reference_time(&self) -> Result<DateTime<Utc>, SyncError>;
}

#[derive(Debug, Deserialize)]
struct ReferenceBody {
    #[serde(rename = "dateTime", alias = "datetime", alias = "utc_datetime")]
    date_time: String,
}

/// Reads an ISO-8601 `dateTime` field from a JSON endpoint
pub struct HttpTimeReference {
    client: reqwest::Client,
    url: String,
    /// Zone applied to timestamps that carry no offset
    zone: FixedOffset,
}

impl HttpTimeReference {
    pub fn new(client: reqwest::Client, url: impl Into<String>, zone: FixedOffset) -> Self {
        Self {
            client,
            url: url.into(),
            zone,
        }
    }
}

#[async_trait]
impl TimeReference for HttpTimeReference {
    async fn reference_time(&self) -> Result<DateTime<Utc>, SyncError> {
        debug!("Requesting reference time from {}", self.url);

        let resp = self.client.get(&self.url).send().await?;
        if !resp.status().is_success() {
            return Err(SyncError::Status(resp.status().as_u16()));
        }

        let body: ReferenceBody = resp
            .json()
            .await
            .map_err(|e| SyncError::Malformed(e.to_string()))?;

        parse_timestamp(&body.date_time, &self.zone)
    }
}

/// RFC 3339 timestamps keep their own offset; zone-less ones are read in `zone`
pub fn parse_timestamp(raw: &str, zone: &FixedOffset) -> Result<DateTime<Utc>, SyncError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive: NaiveDateTime = raw
        .parse()
        .map_err(|e| SyncError::Malformed(format!("bad timestamp {:?}: {}", raw, e)))?;

    zone.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| SyncError::Malformed(format!("timestamp {:?} not representable", raw)))
}

/// Establish the clock offset. Any failure leaves the offset at zero.
pub async fn synchronize_clock(reference: &dyn TimeReference, clock: &CorrectedClock) -> ClockState {
    let state = match reference.reference_time().await {
        Ok(reference_time) => {
            let state = ClockState::from_reference(reference_time, clock.raw_now());
            info!("Clock synchronized, offset {}ms", state.offset_millis);
            state
        }
        Err(e) => {
            warn!("Clock sync failed, using local time: {}", e);
            ClockState::default()
        }
    };
    clock.set_state(state);
    state
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use super::*;
    use crate::state::clock::testing::FixedClock;

    fn jst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    struct FixedReference(Result<DateTime<Utc>, u16>);

    #[async_trait]
    impl TimeReference for FixedReference {
        async fn reference_time(&self) -> Result<DateTime<Utc>, SyncError> {
            self.0.map_err(SyncError::Status)
        }
    }

    #[test]
    fn zone_less_timestamp_uses_schedule_zone() {
        let parsed = parse_timestamp("2024-05-01T21:00:00.1234567", &jst()).unwrap();
        let expected = jst().with_ymd_and_hms(2024, 5, 1, 21, 0, 0).unwrap().with_timezone(&Utc);
        assert_eq!((parsed - expected).num_milliseconds(), 123);
    }

    #[test]
    fn offset_timestamp_keeps_its_offset() {
        let parsed = parse_timestamp("2024-05-01T12:00:00Z", &jst()).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn garbage_timestamp_is_malformed() {
        assert!(matches!(parse_timestamp("yesterday", &jst()), Err(SyncError::Malformed(_))));
    }

    #[tokio::test]
    async fn offset_from_successful_reference() {
        let local = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let clock = CorrectedClock::new(Arc::new(FixedClock::new(local)));
        let reference = FixedReference(Ok(local + Duration::milliseconds(2500)));

        let state = synchronize_clock(&reference, &clock).await;
        assert_eq!(state.offset_millis, 2500);
        assert_eq!(clock.now(), local + Duration::milliseconds(2500));
    }

    #[tokio::test]
    async fn failed_reference_leaves_local_time() {
        let local = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let clock = CorrectedClock::new(Arc::new(FixedClock::new(local)));

        let state = synchronize_clock(&FixedReference(Err(503)), &clock).await;
        assert_eq!(state, ClockState::default());
        assert_eq!(clock.now(), local);
    }
}
