//! Real-time trade aggregation into fixed-length OHLCV bars.
//!
//! This is a facade crate that re-exports functionality from the barcast
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use barcast_lib::prelude::*;
//! use std::sync::Arc;
//! use tokio::sync::{mpsc, watch};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::for_symbol("AAPL");
//!     let emitter = OutputFormat::Text.emitter(config.zone, std::io::stdout());
//!     let engine = Arc::new(AggregationEngine::new(&config, Arc::from(emitter))?);
//!
//!     let feed = FeedClient::connect(FeedConfig {
//!         auth_token: std::env::var("BARCAST_AUTH_TOKEN")?,
//!         ..FeedConfig::default()
//!     })
//!     .await?;
//!
//!     let (trades_tx, trades_rx) = mpsc::channel(1024);
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!     let engine_task = tokio::spawn(engine.run(trades_rx, shutdown_rx.clone()));
//!     feed.run(trades_tx, shutdown_rx).await?;
//!     engine_task.await?;
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barcast/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use barcast_types::*;

// Re-export aggregation
pub use barcast_aggregate::{
    AggregationRecord, AggregationStore, EmissionGate, EmitTrigger, EngineConfig, Heartbeat,
    PricePoint, Processed, TickProcessor,
};

// Re-export the feed client
#[cfg(feature = "feed")]
pub use barcast_feed::{
    ControlMessage, DEFAULT_URL, DecodeError, FeedClient, FeedConfig, FeedError, FeedEvent,
    StatusMessage, decode_events, trade_channel,
};

// Re-export formatters
#[cfg(feature = "format")]
pub use barcast_format::{
    Emitter, FormatError, Formatter, JsonFormatter, OutputFormat, TextFormatter, WriterEmitter,
};

// Re-export the engine
#[cfg(feature = "engine")]
pub use barcast_engine::{AggregationEngine, EngineStats, ManualClock, SystemClock, WallClock};

/// Prelude module for convenient imports.
///
/// ```
/// use barcast_lib::prelude::*;
/// ```
pub mod prelude {
    pub use barcast_types::{BucketClock, BucketLength, BucketZone, ConfigError, Trade};

    pub use barcast_aggregate::{
        AggregationRecord, AggregationStore, EmitTrigger, EngineConfig, TickProcessor,
    };

    #[cfg(feature = "feed")]
    pub use barcast_feed::{FeedClient, FeedConfig, FeedError};

    #[cfg(feature = "format")]
    pub use barcast_format::{Emitter, OutputFormat};

    #[cfg(feature = "engine")]
    pub use barcast_engine::AggregationEngine;
}
