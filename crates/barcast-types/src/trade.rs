//! Trade tick representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event kind the feed uses for trade ticks.
pub const TRADE_EVENT: &str = "T";

/// Event kind the feed uses for control messages.
pub const STATUS_EVENT: &str = "status";

/// A single reported trade for the instrument.
///
/// Field names follow the feed's wire format. Only `symbol`, `price` and
/// `timestamp` take part in aggregation; the remaining fields are carried
/// through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Event kind (`"T"` for trades).
    #[serde(rename = "ev")]
    pub event: String,
    /// Ticker symbol.
    #[serde(rename = "sym")]
    pub symbol: String,
    /// Trade identifier assigned by the exchange.
    #[serde(rename = "i", default)]
    pub trade_id: String,
    /// Exchange identifier.
    #[serde(rename = "x", default)]
    pub exchange: u32,
    /// Trade price.
    #[serde(rename = "p")]
    pub price: f64,
    /// Trade size.
    #[serde(rename = "s", default)]
    pub size: u64,
    /// Trade condition codes.
    #[serde(rename = "c", default)]
    pub conditions: Vec<i32>,
    /// Trade time, sent as epoch milliseconds.
    #[serde(rename = "t", with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Tape identifier.
    #[serde(rename = "z", default)]
    pub tape: u8,
}

impl Trade {
    /// Creates a trade carrying only the fields aggregation needs.
    #[must_use]
    pub fn new(symbol: impl Into<String>, price: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            event: TRADE_EVENT.to_string(),
            symbol: symbol.into(),
            trade_id: String::new(),
            exchange: 0,
            price,
            size: 0,
            conditions: Vec::new(),
            timestamp,
            tape: 0,
        }
    }

    /// Sets the trade size.
    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }
}
