//! Human-readable line format.

use barcast_aggregate::{AggregationRecord, EmitTrigger};
use barcast_types::BucketZone;
use std::io::Write;

use crate::{FormatError, Formatter};

/// Placeholder for a price no tick has set.
const UNSET: &str = "-";

/// Writes `HH:MM:SS - open: $X.XX, close: $X.XX, high: $X.XX, low: $X.XX, volume: N`.
///
/// The bucket start is shown in the configured zone. The trigger is not
/// part of the line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormatter {
    zone: BucketZone,
}

impl TextFormatter {
    /// Creates a formatter rendering bucket times in `zone`.
    #[must_use]
    pub const fn new(zone: BucketZone) -> Self {
        Self { zone }
    }

    /// Renders one bar without the trailing newline.
    #[must_use]
    pub fn render(&self, bar: &AggregationRecord) -> String {
        format!(
            "{} - open: {}, close: {}, high: {}, low: {}, volume: {}",
            self.zone.format_hms(bar.bucket_start),
            price(bar.open_price()),
            price(bar.close_price()),
            price(bar.high),
            price(bar.low),
            bar.volume
        )
    }
}

fn price(value: Option<f64>) -> String {
    value.map_or_else(|| UNSET.to_string(), |p| format!("${p:.2}"))
}

impl Formatter for TextFormatter {
    fn write_bar<W: Write>(
        &self,
        bar: &AggregationRecord,
        _trigger: EmitTrigger,
        mut writer: W,
    ) -> Result<(), FormatError> {
        writeln!(writer, "{}", self.render(bar))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barcast_aggregate::PricePoint;
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, hour, minute, second).unwrap()
    }

    fn bar() -> AggregationRecord {
        AggregationRecord {
            symbol: "AAPL".to_string(),
            bucket_start: at(10, 1, 0),
            open: Some(PricePoint::new(100.0, at(10, 1, 5))),
            close: Some(PricePoint::new(102.0, at(10, 1, 20))),
            high: Some(102.0),
            low: Some(100.0),
            volume: 2,
        }
    }

    #[test]
    fn test_render_line() {
        let formatter = TextFormatter::new(BucketZone::Utc);
        assert_eq!(
            formatter.render(&bar()),
            "10:01:00 - open: $100.00, close: $102.00, high: $102.00, low: $100.00, volume: 2"
        );
    }

    #[test]
    fn test_prices_round_to_cents() {
        let mut bar = bar();
        bar.high = Some(145.916);
        bar.low = Some(0.0);
        let line = TextFormatter::new(BucketZone::Utc).render(&bar);
        assert!(line.contains("high: $145.92"));
        assert!(line.contains("low: $0.00"));
    }

    #[test]
    fn test_empty_bar_renders_dashes() {
        let empty = AggregationRecord::empty("AAPL", at(10, 1, 30));
        let line = TextFormatter::new(BucketZone::Utc).render(&empty);
        assert_eq!(
            line,
            "10:01:30 - open: -, close: -, high: -, low: -, volume: 0"
        );
    }

    #[test]
    fn test_zone_shifts_label() {
        let zone = BucketZone::Fixed(FixedOffset::west_opt(5 * 3600).unwrap());
        let line = TextFormatter::new(zone).render(&bar());
        assert!(line.starts_with("05:01:00 - "));
    }

    #[test]
    fn test_write_bar_appends_newline() {
        let mut output = Vec::new();
        TextFormatter::new(BucketZone::Utc)
            .write_bar(&bar(), EmitTrigger::Heartbeat, &mut output)
            .unwrap();
        let written = String::from_utf8(output).unwrap();
        assert!(written.ends_with("volume: 2\n"));
        assert_eq!(written.lines().count(), 1);
    }
}
