//! Per-tick aggregation.

use barcast_types::{BucketClock, ConfigError, Trade};
use chrono::{DateTime, Utc};

use crate::{AggregationRecord, AggregationStore, EmissionGate, EngineConfig};

/// Result of folding one trade into the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Processed {
    /// The bucket's record after the update.
    pub record: AggregationRecord,
    /// Whether the emission gate asked for an immediate report.
    pub emit_now: bool,
}

/// Routes trades to their bucket and maintains the bucket's OHLCV record.
///
/// When several trades share a timestamp, the first one processed sets
/// open and close for that timestamp; later ones can still move high and
/// low.
#[derive(Debug, Clone, Copy)]
pub struct TickProcessor {
    clock: BucketClock,
    gate: EmissionGate,
}

impl TickProcessor {
    /// Creates a processor from a bucket clock and an emission gate.
    #[must_use]
    pub const fn new(clock: BucketClock, gate: EmissionGate) -> Self {
        Self { clock, gate }
    }

    /// Creates a processor from the engine configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured duration is out of range.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.clock(), EmissionGate::from_config(config)?))
    }

    /// Returns the bucket clock.
    #[must_use]
    pub const fn clock(&self) -> &BucketClock {
        &self.clock
    }

    /// Returns the emission gate.
    #[must_use]
    pub const fn gate(&self) -> &EmissionGate {
        &self.gate
    }

    /// Folds `trade` into its bucket's record, evaluating the emission gate
    /// against wall-clock `now` if the trade became the bucket's close.
    pub fn process(
        &self,
        trade: &Trade,
        store: &mut AggregationStore,
        now: DateTime<Utc>,
    ) -> Processed {
        let bucket = self.clock.bucket_start(trade.timestamp);
        let record = store.get_or_create(bucket, &trade.symbol);

        let close_updated = record.apply(trade.price, trade.timestamp);
        let emit_now = close_updated && self.gate.should_emit(trade.timestamp, now);

        Processed {
            record: record.clone(),
            emit_now,
        }
    }
}
