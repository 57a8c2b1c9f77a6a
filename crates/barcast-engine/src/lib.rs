//! Concurrent aggregation engine for barcast.
//!
//! - [`AggregationEngine`] - Shared store with ingestion and heartbeat paths
//! - [`WallClock`] - Source of "now" for the emission gate and heartbeat

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barcast/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod clock;
mod engine;

pub use clock::{ManualClock, SystemClock, WallClock};
pub use engine::{AggregationEngine, EngineStats};
