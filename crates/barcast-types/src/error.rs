//! Error types for barcast.

use std::time::Duration;
use thiserror::Error;

use crate::ZoneParseError;

/// Errors raised while validating engine configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Bucket length is not a positive number of whole seconds dividing one day.
    #[error(
        "Invalid bucket length {millis}ms: expected whole seconds that evenly divide one day"
    )]
    InvalidBucketLength {
        /// The rejected length in milliseconds.
        millis: u128,
    },

    /// Staleness tolerance must be positive.
    #[error("Staleness tolerance must be greater than zero")]
    ZeroStalenessTolerance,

    /// Retention window shorter than one bucket would evict live buckets.
    #[error("Retention window {retention:?} is shorter than the bucket length {bucket:?}")]
    RetentionTooShort {
        /// The configured retention window.
        retention: Duration,
        /// The configured bucket length.
        bucket: Duration,
    },

    /// A duration does not fit chrono's time delta range.
    #[error("Duration {0:?} is out of range")]
    DurationOutOfRange(Duration),

    /// Invalid bucket zone.
    #[error(transparent)]
    Zone(#[from] ZoneParseError),
}
