//! Newline-delimited JSON format.

use barcast_aggregate::{AggregationRecord, EmitTrigger};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

use crate::{FormatError, Formatter};

/// Flat JSON view of one emitted bar.
#[derive(Serialize)]
struct BarLine<'a> {
    trigger: EmitTrigger,
    symbol: &'a str,
    bucket_start: DateTime<Utc>,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: u64,
}

impl<'a> From<(&'a AggregationRecord, EmitTrigger)> for BarLine<'a> {
    fn from((bar, trigger): (&'a AggregationRecord, EmitTrigger)) -> Self {
        Self {
            trigger,
            symbol: &bar.symbol,
            bucket_start: bar.bucket_start,
            open: bar.open_price(),
            high: bar.high,
            low: bar.low,
            close: bar.close_price(),
            volume: bar.volume,
        }
    }
}

/// NDJSON formatter: one object per bar, unset prices as `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Creates an NDJSON formatter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Formatter for JsonFormatter {
    fn write_bar<W: Write>(
        &self,
        bar: &AggregationRecord,
        trigger: EmitTrigger,
        mut writer: W,
    ) -> Result<(), FormatError> {
        serde_json::to_writer(&mut writer, &BarLine::from((bar, trigger)))?;
        writeln!(writer)?;
        Ok(())
    }
}
