//! Shared output sink.

use barcast_aggregate::{AggregationRecord, EmitTrigger};
use std::io::Write;
use std::sync::{Mutex, PoisonError};

use crate::{FormatError, Formatter};

/// Destination for emitted bars.
///
/// Called from both the ingestion and heartbeat paths, so implementations
/// must serialize their own writes.
pub trait Emitter: Send + Sync {
    /// Emits one bar.
    ///
    /// # Errors
    ///
    /// Returns an error if the bar cannot be written.
    fn emit(&self, bar: &AggregationRecord, trigger: EmitTrigger) -> Result<(), FormatError>;
}

/// Emitter that formats bars onto a writer, one flush per bar.
#[derive(Debug)]
pub struct WriterEmitter<F, W> {
    formatter: F,
    writer: Mutex<W>,
}

impl<F: Formatter, W: Write + Send> WriterEmitter<F, W> {
    /// Creates an emitter writing through `formatter` to `writer`.
    pub const fn new(formatter: F, writer: W) -> Self {
        Self {
            formatter,
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the emitter, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<F: Formatter, W: Write + Send> Emitter for WriterEmitter<F, W> {
    fn emit(&self, bar: &AggregationRecord, trigger: EmitTrigger) -> Result<(), FormatError> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        self.formatter.write_bar(bar, trigger, &mut *writer)?;
        writer.flush()?;
        Ok(())
    }
}
