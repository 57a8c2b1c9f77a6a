//! Output format abstraction.

use barcast_aggregate::{AggregationRecord, EmitTrigger};
use barcast_types::BucketZone;
use std::io::Write;
use thiserror::Error;

use crate::{Emitter, JsonFormatter, TextFormatter, WriterEmitter};

/// Output format identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// One human-readable line per bar.
    #[default]
    Text,
    /// Newline-delimited JSON.
    Ndjson,
}

impl OutputFormat {
    /// Returns the format name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Ndjson => "ndjson",
        }
    }

    /// Returns all available formats.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Text, Self::Ndjson]
    }

    /// Builds an emitter that writes this format to `writer`, rendering
    /// bucket times in `zone` where the format shows wall-clock times.
    #[must_use]
    pub fn emitter<W>(self, zone: BucketZone, writer: W) -> Box<dyn Emitter>
    where
        W: Write + Send + 'static,
    {
        match self {
            Self::Text => Box::new(WriterEmitter::new(TextFormatter::new(zone), writer)),
            Self::Ndjson => Box::new(WriterEmitter::new(JsonFormatter::new(), writer)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "ndjson" | "jsonl" | "json" => Ok(Self::Ndjson),
            _ => Err(FormatError::UnknownFormat(s.to_string())),
        }
    }
}

/// Errors that can occur during formatting.
#[derive(Error, Debug)]
pub enum FormatError {
    /// Unknown output format.
    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Trait for bar formatters.
pub trait Formatter: Send + Sync {
    /// Writes one bar, terminated by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_bar<W: Write>(
        &self,
        bar: &AggregationRecord,
        trigger: EmitTrigger,
        writer: W,
    ) -> Result<(), FormatError>;
}
