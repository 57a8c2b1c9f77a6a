//! Output selection for the barcast CLI.

use barcast_lib::{BucketZone, Emitter, OutputFormat};
use clap::ValueEnum;
use std::sync::Arc;

/// Output format for emitted bars.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum Format {
    /// One human-readable line per bar
    Text,
    /// One JSON object per bar, including the trigger
    Ndjson,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => Self::Text,
            Format::Ndjson => Self::Ndjson,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", OutputFormat::from(*self))
    }
}

/// Builds the emitter that writes bars to stdout.
pub(crate) fn stdout_emitter(format: Format, zone: BucketZone) -> Arc<dyn Emitter> {
    Arc::from(OutputFormat::from(format).emitter(zone, std::io::stdout()))
}
