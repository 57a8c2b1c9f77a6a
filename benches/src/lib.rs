//! Benchmark utilities for barcast.

use barcast_types::Trade;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};

/// Generates a deterministic trade sequence resembling one symbol's feed.
#[derive(Debug, Clone)]
pub struct SyntheticFeed {
    /// Symbol stamped on every trade.
    pub symbol: String,
    /// Timestamp of the first trade.
    pub start: DateTime<Utc>,
    /// Gap between consecutive trades.
    pub spacing: TimeDelta,
    /// Every `late_every`-th trade is stamped before its predecessor
    /// (0 disables out-of-order trades).
    pub late_every: usize,
}

impl Default for SyntheticFeed {
    fn default() -> Self {
        Self {
            symbol: "AAPL".to_string(),
            start: Utc
                .with_ymd_and_hms(2024, 1, 2, 14, 30, 0)
                .single()
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            spacing: TimeDelta::milliseconds(50),
            late_every: 0,
        }
    }
}

impl SyntheticFeed {
    /// Returns `count` trades with a bounded random-walk price.
    pub fn trades(&self, count: usize) -> Vec<Trade> {
        let mut price = 150.0_f64;
        let mut state = 0x2545_f491_u64;

        (0..count)
            .map(|i| {
                // xorshift keeps the sequence reproducible without a RNG crate
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                let step = ((state % 21) as f64 - 10.0) / 100.0;
                price = (price + step).max(1.0);

                let mut offset = self.spacing * i as i32;
                if self.late_every > 0 && i > 0 && i % self.late_every == 0 {
                    offset -= self.spacing * 3;
                }
                Trade::new(self.symbol.as_str(), price, self.start + offset).with_size(100)
            })
            .collect()
    }

    /// Encodes trades as feed payloads of `batch` trades each.
    pub fn payloads(&self, count: usize, batch: usize) -> Vec<String> {
        self.trades(count)
            .chunks(batch.max(1))
            .map(|chunk| serde_json::to_string(chunk).unwrap_or_default())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trades_are_deterministic() {
        let feed = SyntheticFeed::default();
        assert_eq!(feed.trades(100), feed.trades(100));
    }

    #[test]
    fn test_late_trades() {
        let feed = SyntheticFeed {
            late_every: 10,
            ..SyntheticFeed::default()
        };
        let trades = feed.trades(11);
        assert!(trades[10].timestamp < trades[9].timestamp);
    }

    #[test]
    fn test_payloads_are_arrays() {
        let payloads = SyntheticFeed::default().payloads(10, 4);
        assert_eq!(payloads.len(), 3);
        assert!(payloads.iter().all(|p| p.starts_with('[')));
    }
}
