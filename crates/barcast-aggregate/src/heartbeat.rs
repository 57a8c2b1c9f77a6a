//! Periodic reporting of the most recently settled bucket.

use barcast_types::{BucketClock, ConfigError};
use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

use crate::config::to_delta;
use crate::{AggregationRecord, AggregationStore, EngineConfig};

/// Computes which bucket a heartbeat reports and what it reports for it.
///
/// A bucket counts as settled once a full bucket length plus the feed lag
/// has passed since it could have received its last tick.
#[derive(Debug, Clone)]
pub struct Heartbeat {
    clock: BucketClock,
    lookback: TimeDelta,
    retention: Option<TimeDelta>,
    symbol: String,
}

impl Heartbeat {
    /// Creates a heartbeat from the engine configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured duration is out of range.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        let lookback = config
            .bucket_length
            .as_time_delta()
            .checked_add(&to_delta(config.feed_lag)?)
            .ok_or(ConfigError::DurationOutOfRange(config.feed_lag))?;
        let retention = config.retention.map(to_delta).transpose()?;
        Ok(Self {
            clock: config.clock(),
            lookback,
            retention,
            symbol: config.symbol.clone(),
        })
    }

    /// Returns the heartbeat period (one bucket length).
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.clock.length().as_duration()
    }

    /// Returns the start of the bucket that is settled at wall-clock `now`.
    #[must_use]
    pub fn settled_bucket(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let feed_now = now
            .checked_sub_signed(self.lookback)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.clock.bucket_start(feed_now)
    }

    /// Returns the record to report at `now`.
    ///
    /// Falls back to an empty record when no tick reached the settled bucket.
    #[must_use]
    pub fn report(&self, store: &AggregationStore, now: DateTime<Utc>) -> AggregationRecord {
        let bucket = self.settled_bucket(now);
        store
            .get(bucket)
            .cloned()
            .unwrap_or_else(|| AggregationRecord::empty(&self.symbol, bucket))
    }

    /// Returns the bucket start before which records may be evicted, if a
    /// retention window is configured.
    #[must_use]
    pub fn retention_cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.settled_bucket(now).checked_sub_signed(self.retention?)
    }
}
