//! Streaming run: feed in, bars out.

use anyhow::{Context, Result};
use barcast_lib::{AggregationEngine, BucketLength, EngineConfig, FeedClient, FeedConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::Cli;
use crate::display::stdout_emitter;

/// Trades buffered between the feed and the engine.
const TRADE_CHANNEL_CAPACITY: usize = 4096;

fn engine_config(cli: &Cli) -> Result<EngineConfig> {
    let bucket_length = BucketLength::from_secs(cli.bucket_secs)
        .with_context(|| format!("Invalid bucket length: {}s", cli.bucket_secs))?;
    let config = EngineConfig {
        symbol: cli.symbol.to_uppercase(),
        bucket_length,
        feed_lag: Duration::from_secs(cli.feed_lag_secs),
        staleness_tolerance: Duration::from_secs(cli.staleness_secs),
        zone: cli.zone,
        retention: cli.retention_secs.map(Duration::from_secs),
    };
    config.validate().context("Invalid engine configuration")?;
    Ok(config)
}

fn feed_config(cli: &Cli) -> FeedConfig {
    FeedConfig {
        url: cli.url.clone(),
        auth_token: cli.auth_token.clone(),
        symbol: cli.symbol.to_uppercase(),
        max_retries: cli.max_retries,
        ..FeedConfig::default()
    }
}

/// Tells the engine and the feed to stop.
fn signal_shutdown(shutdown: &watch::Sender<bool>) {
    if let Err(e) = shutdown.send(true) {
        debug!(error = %e, "Both tasks already stopped");
    }
}

/// Connects to the feed and aggregates until Ctrl+C or a fatal feed error.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = engine_config(&cli)?;
    let engine = Arc::new(AggregationEngine::new(
        &config,
        stdout_emitter(cli.format, cli.zone),
    )?);

    let feed_config = feed_config(&cli);
    let feed = FeedClient::connect(feed_config.clone())
        .await
        .context("Failed to start trade feed")?;
    info!(
        symbol = %config.symbol,
        url = %feed_config.url,
        bucket = %config.bucket_length,
        zone = %config.zone,
        "Connected to trade feed"
    );

    let (trades_tx, trades_rx) = mpsc::channel(TRADE_CHANNEL_CAPACITY);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let engine_task = tokio::spawn(Arc::clone(&engine).run(trades_rx, shutdown_rx.clone()));
    let mut feed_task = tokio::spawn(feed.run(trades_tx, shutdown_rx));

    let finished = tokio::select! {
        result = &mut feed_task => Some(result),
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl+C")?;
            info!("Interrupted, shutting down");
            None
        }
    };

    signal_shutdown(&shutdown_tx);
    let feed_result = match finished {
        Some(result) => result,
        None => feed_task.await,
    };

    let stats = engine_task.await.context("Engine task panicked")?;
    info!(
        ticks = stats.ticks,
        emissions = stats.emissions,
        "Done"
    );

    feed_result
        .context("Feed task panicked")?
        .context("Trade feed failed")?;
    Ok(())
}
