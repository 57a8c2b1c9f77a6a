//! Core types for the barcast tick-to-bar aggregation engine.
//!
//! This crate provides the fundamental data structures used throughout barcast:
//!
//! - [`Trade`] - A single trade tick as delivered by the feed
//! - [`BucketClock`] - Maps a timestamp to the start of its fixed-length bucket
//! - [`BucketLength`] - Validated bucket length
//! - [`BucketZone`] - Zone in which bucket boundaries are computed
//! - [`ConfigError`] - Configuration validation errors

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barcast/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bucket;
mod error;
mod trade;

pub use bucket::{BucketClock, BucketLength, BucketZone, ZoneParseError};
pub use error::ConfigError;
pub use trade::{STATUS_EVENT, TRADE_EVENT, Trade};
