//! Engine configuration.

use barcast_types::{BucketClock, BucketLength, BucketZone, ConfigError};
use chrono::TimeDelta;
use std::time::Duration;

/// Named configuration values for the aggregation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Instrument symbol the engine aggregates.
    pub symbol: String,
    /// Length of one bucket; also the heartbeat period.
    pub bucket_length: BucketLength,
    /// Delay between market time and delivery time of the feed.
    pub feed_lag: Duration,
    /// How far behind the wall clock a tick may be stamped and still trigger
    /// an early emission.
    pub staleness_tolerance: Duration,
    /// Zone bucket boundaries and bar times are computed in.
    pub zone: BucketZone,
    /// How long settled buckets are kept; `None` keeps every bucket.
    pub retention: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            symbol: "AAPL".to_string(),
            bucket_length: BucketLength::THIRTY_SECONDS,
            feed_lag: Duration::from_secs(15 * 60),
            staleness_tolerance: Duration::from_secs(60 * 60),
            zone: BucketZone::Local,
            retention: None,
        }
    }
}

impl EngineConfig {
    /// Creates a configuration for the given symbol with default timings.
    #[must_use]
    pub fn for_symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    /// Returns the bucket clock described by this configuration.
    #[must_use]
    pub const fn clock(&self) -> BucketClock {
        BucketClock::new(self.bucket_length, self.zone)
    }

    /// Checks that the configured values can be used together.
    ///
    /// # Errors
    ///
    /// Returns an error if the staleness tolerance is zero, a duration is out
    /// of range, or the retention window is shorter than one bucket.
    pub fn validate(&self) -> Result<(), ConfigError> {
        to_delta(self.feed_lag)?;
        if to_delta(self.staleness_tolerance)? <= TimeDelta::zero() {
            return Err(ConfigError::ZeroStalenessTolerance);
        }
        if let Some(retention) = self.retention {
            to_delta(retention)?;
            if retention < self.bucket_length.as_duration() {
                return Err(ConfigError::RetentionTooShort {
                    retention,
                    bucket: self.bucket_length.as_duration(),
                });
            }
        }
        Ok(())
    }
}

/// Converts a configured duration into a chrono time delta.
pub(crate) fn to_delta(duration: Duration) -> Result<TimeDelta, ConfigError> {
    TimeDelta::from_std(duration).map_err(|_| ConfigError::DurationOutOfRange(duration))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.bucket_length.seconds(), 30);
        assert_eq!(config.feed_lag, Duration::from_secs(900));
        assert_eq!(config.staleness_tolerance, Duration::from_secs(3600));
        assert_eq!(config.retention, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_staleness_rejected() {
        let config = EngineConfig {
            staleness_tolerance: Duration::ZERO,
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroStalenessTolerance));
    }

    #[test]
    fn test_short_retention_rejected() {
        let config = EngineConfig {
            retention: Some(Duration::from_secs(10)),
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RetentionTooShort { .. })
        ));
    }

    #[test]
    fn test_out_of_range_duration_rejected() {
        let config = EngineConfig {
            feed_lag: Duration::MAX,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DurationOutOfRange(_))
        ));
    }
}
