//! barcast CLI - Live trade aggregation into OHLCV bars.

use anyhow::Result;
use barcast_lib::{BucketZone, DEFAULT_URL};
use clap::Parser;
use tracing::debug;

mod display;
mod logging;
mod run;

use display::Format;

#[derive(Parser)]
#[command(name = "barcast")]
#[command(about = "Aggregates a live trade feed into fixed-length OHLCV bars", long_about = None)]
#[command(version)]
struct Cli {
    /// Feed API token
    #[arg(short, long, env = "BARCAST_AUTH_TOKEN", hide_env_values = true)]
    auth_token: String,

    /// Instrument symbol to subscribe to
    #[arg(short, long, default_value = "AAPL")]
    symbol: String,

    /// Feed WebSocket endpoint
    #[arg(long, default_value = DEFAULT_URL)]
    url: String,

    /// Bucket length in seconds (must divide a day)
    #[arg(long, default_value_t = 30)]
    bucket_secs: u64,

    /// Delay between market time and delivery time of the feed, in seconds
    #[arg(long, default_value_t = 900)]
    feed_lag_secs: u64,

    /// Maximum age relative to the wall clock of a trade that may still be
    /// emitted early, in seconds
    #[arg(long, default_value_t = 3600)]
    staleness_secs: u64,

    /// Drop buckets older than this many seconds (omit to keep everything)
    #[arg(long)]
    retention_secs: Option<u64>,

    /// Zone for bucket boundaries and bar times (local, utc, +HH:MM)
    #[arg(short, long, default_value = "local")]
    zone: BucketZone,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: Format,

    /// Consecutive reconnect attempts before giving up
    #[arg(long, default_value_t = 10)]
    max_retries: u32,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    install_crypto_provider();
    run::run(cli).await
}

/// Installs the ring provider rustls 0.23 needs for wss:// endpoints.
///
/// Returns false if a provider was already installed.
fn install_crypto_provider() -> bool {
    match rustls::crypto::ring::default_provider().install_default() {
        Ok(()) => true,
        Err(existing) => {
            debug!(provider = ?existing, "Crypto provider already installed");
            false
        }
    }
}
