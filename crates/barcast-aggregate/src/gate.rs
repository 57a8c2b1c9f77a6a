//! Early-emission policy.

use barcast_types::{BucketLength, ConfigError};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::EngineConfig;
use crate::config::to_delta;

/// What caused a record to be emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitTrigger {
    /// Regular heartbeat for the most recently settled bucket.
    Heartbeat,
    /// The emission gate fired when a bucket's close moved.
    Settled,
    /// Final flush on shutdown.
    Shutdown,
}

impl EmitTrigger {
    /// Returns the trigger as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Heartbeat => "heartbeat",
            Self::Settled => "settled",
            Self::Shutdown => "shutdown",
        }
    }
}

impl std::fmt::Display for EmitTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decides whether a refreshed close warrants an immediate report.
///
/// The gate fires when the tick is stamped later than both
/// `now + bucket_length - feed_lag` and `now - staleness_tolerance`. The
/// first bound holds back ticks from buckets the heartbeat already covers;
/// the second keeps catch-up bursts of old ticks from flooding the output
/// when the feed lag is configured longer than the tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmissionGate {
    bucket_length: TimeDelta,
    feed_lag: TimeDelta,
    staleness_tolerance: TimeDelta,
}

impl EmissionGate {
    /// Creates a gate from explicit timings.
    #[must_use]
    pub fn new(
        bucket_length: BucketLength,
        feed_lag: TimeDelta,
        staleness_tolerance: TimeDelta,
    ) -> Self {
        Self {
            bucket_length: bucket_length.as_time_delta(),
            feed_lag,
            staleness_tolerance,
        }
    }

    /// Creates a gate from the engine configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured duration is out of range.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.bucket_length,
            to_delta(config.feed_lag)?,
            to_delta(config.staleness_tolerance)?,
        ))
    }

    /// Ticks must be stamped strictly after this instant to emit early.
    #[must_use]
    pub fn settled_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        now.checked_add_signed(self.bucket_length)?
            .checked_sub_signed(self.feed_lag)
    }

    /// Ticks must be stamped strictly after this instant to count as fresh.
    #[must_use]
    pub fn oldest_accepted(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        now.checked_sub_signed(self.staleness_tolerance)
    }

    /// Returns true if a tick stamped `tick_timestamp`, whose bucket close was
    /// just refreshed at wall-clock `now`, should be emitted immediately.
    #[must_use]
    pub fn should_emit(&self, tick_timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let (Some(settled), Some(oldest)) = (self.settled_after(now), self.oldest_accepted(now))
        else {
            return false;
        };
        settled < tick_timestamp && oldest < tick_timestamp
    }
}
