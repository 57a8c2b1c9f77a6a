//! Per-bucket OHLCV record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A price observed at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trade price.
    pub price: f64,
    /// Trade time.
    pub timestamp: DateTime<Utc>,
}

impl PricePoint {
    /// Creates a new price point.
    #[must_use]
    pub const fn new(price: f64, timestamp: DateTime<Utc>) -> Self {
        Self { price, timestamp }
    }
}

/// OHLCV state of one bucket.
///
/// Every price field is `None` until the first tick lands in the bucket, so
/// a trade at exactly `0.0` is never confused with "nothing observed yet".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationRecord {
    /// Instrument symbol.
    pub symbol: String,
    /// Start of the bucket this record covers.
    pub bucket_start: DateTime<Utc>,
    /// Earliest tick observed (first arrival wins on a tied timestamp).
    pub open: Option<PricePoint>,
    /// Latest tick observed (first arrival wins on a tied timestamp).
    pub close: Option<PricePoint>,
    /// Highest price observed.
    pub high: Option<f64>,
    /// Lowest price observed.
    pub low: Option<f64>,
    /// Number of ticks observed.
    pub volume: u64,
}

impl AggregationRecord {
    /// Creates a record with no ticks observed.
    #[must_use]
    pub fn empty(symbol: impl Into<String>, bucket_start: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            bucket_start,
            open: None,
            close: None,
            high: None,
            low: None,
            volume: 0,
        }
    }

    /// Returns true if no tick has been observed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.volume == 0
    }

    /// Returns the opening price.
    #[must_use]
    pub fn open_price(&self) -> Option<f64> {
        self.open.map(|p| p.price)
    }

    /// Returns the time of the opening tick.
    #[must_use]
    pub fn open_timestamp(&self) -> Option<DateTime<Utc>> {
        self.open.map(|p| p.timestamp)
    }

    /// Returns the closing price.
    #[must_use]
    pub fn close_price(&self) -> Option<f64> {
        self.close.map(|p| p.price)
    }

    /// Returns the time of the closing tick.
    #[must_use]
    pub fn close_timestamp(&self) -> Option<DateTime<Utc>> {
        self.close.map(|p| p.timestamp)
    }

    /// Folds one tick into the record.
    ///
    /// Returns true if the tick became the new close.
    pub(crate) fn apply(&mut self, price: f64, timestamp: DateTime<Utc>) -> bool {
        if self.high.is_none_or(|high| price > high) {
            self.high = Some(price);
        }
        if self.low.is_none_or(|low| price < low) {
            self.low = Some(price);
        }
        if self.open.is_none_or(|open| timestamp < open.timestamp) {
            self.open = Some(PricePoint::new(price, timestamp));
        }

        // Ties keep the first close seen at that timestamp.
        let close_updated = self.close.is_none_or(|close| timestamp > close.timestamp);
        if close_updated {
            self.close = Some(PricePoint::new(price, timestamp));
        }

        self.volume += 1;
        close_updated
    }
}
