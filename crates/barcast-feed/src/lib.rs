//! WebSocket trade feed for barcast.
//!
//! - [`FeedClient`] - Authenticated, subscribed connection with reconnects
//! - [`decode_events`] - Splits a payload into trades and status messages
//! - [`ControlMessage`] - `auth` and `subscribe` wire messages

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barcast/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod control;
mod parse;
mod stream;

pub use client::{FeedClient, FeedConfig, FeedError};
pub use control::{ControlAction, ControlMessage, DEFAULT_URL, trade_channel};
pub use parse::{DecodeError, FeedEvent, StatusMessage, decode_events};
