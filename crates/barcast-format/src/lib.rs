//! Output formatters for barcast OHLCV bars.
//!
//! - [`TextFormatter`] - One human-readable line per bar
//! - [`JsonFormatter`] - Newline-delimited JSON
//! - [`Emitter`] - Thread-safe sink shared by the engine

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barcast/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod emitter;
mod formatter;
mod json;
mod text;

pub use emitter::{Emitter, WriterEmitter};
pub use formatter::{FormatError, Formatter, OutputFormat};
pub use json::JsonFormatter;
pub use text::TextFormatter;
