//! Time-bucketed OHLCV aggregation for the barcast engine.
//!
//! This crate provides the aggregation core:
//!
//! - [`AggregationRecord`] - OHLCV state of one bucket
//! - [`AggregationStore`] - Bucket-keyed record storage
//! - [`TickProcessor`] - Folds trades into their bucket's record
//! - [`EmissionGate`] - Decides when a refreshed bucket is reported early
//! - [`Heartbeat`] - Picks the settled bucket reported on every period
//! - [`EngineConfig`] - Named timing values shared by all of the above

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barcast/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod gate;
mod heartbeat;
mod processor;
mod record;
mod store;

pub use config::EngineConfig;
pub use gate::{EmissionGate, EmitTrigger};
pub use heartbeat::Heartbeat;
pub use processor::{Processed, TickProcessor};
pub use record::{AggregationRecord, PricePoint};
pub use store::AggregationStore;
