//! WebSocket connection setup and reconnect policy.

use futures::SinkExt;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;

use crate::control::{ControlMessage, DEFAULT_URL, trade_channel};
use crate::parse::DecodeError;

pub(crate) type FeedSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Shortest delay between reconnect attempts.
const MIN_BACKOFF_MS: u64 = 100;

/// Configuration for the feed client.
#[derive(Clone)]
pub struct FeedConfig {
    /// WebSocket endpoint.
    pub url: String,
    /// Token sent in the `auth` message.
    pub auth_token: String,
    /// Instrument whose trade channel is subscribed.
    pub symbol: String,
    /// Timeout for establishing one connection.
    pub connect_timeout: Duration,
    /// Maximum consecutive reconnect attempts after a disconnect.
    pub max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds).
    pub base_delay_ms: u64,
    /// Maximum delay between reconnect attempts (in milliseconds).
    pub max_delay_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            auth_token: String::new(),
            symbol: "AAPL".to_string(),
            connect_timeout: Duration::from_secs(10),
            max_retries: 10,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
        }
    }
}

impl std::fmt::Debug for FeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedConfig")
            .field("url", &self.url)
            .field("auth_token", &"<redacted>")
            .field("symbol", &self.symbol)
            .field("connect_timeout", &self.connect_timeout)
            .field("max_retries", &self.max_retries)
            .field("base_delay_ms", &self.base_delay_ms)
            .field("max_delay_ms", &self.max_delay_ms)
            .finish()
    }
}

impl FeedConfig {
    /// Returns the channel subscribed on every connection.
    #[must_use]
    pub fn channel(&self) -> String {
        trade_channel(&self.symbol)
    }

    /// Calculates the delay before reconnect `attempt` (1-based), using
    /// exponential backoff with deterministic jitter of up to 25%.
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp_delay = self.base_delay_ms.saturating_mul(1u64 << attempt.min(10));
        let capped_delay = exp_delay.min(self.max_delay_ms);

        let jitter_range = capped_delay / 4;
        let jitter = if jitter_range > 0 {
            let offset = (u64::from(attempt) * 17) % (jitter_range * 2);
            offset as i64 - jitter_range as i64
        } else {
            0
        };

        let final_delay = (capped_delay as i64 + jitter).max(MIN_BACKOFF_MS as i64) as u64;
        Duration::from_millis(final_delay)
    }
}

/// Errors that end the feed.
#[derive(Error, Debug)]
pub enum FeedError {
    /// The WebSocket connection could not be established.
    #[error("Failed to connect to {url}: {source}")]
    Connect {
        /// Endpoint that refused the connection.
        url: String,
        /// Underlying transport error.
        #[source]
        source: Box<tungstenite::Error>,
    },

    /// The connection was not established in time.
    #[error("Timed out connecting to {url} after {timeout:?}")]
    ConnectTimeout {
        /// Endpoint that did not answer.
        url: String,
        /// Configured connect timeout.
        timeout: Duration,
    },

    /// A control message could not be sent.
    #[error("Failed to send {action} message: {source}")]
    Send {
        /// Action of the message that failed.
        action: &'static str,
        /// Underlying transport error.
        #[source]
        source: Box<tungstenite::Error>,
    },

    /// A control message could not be encoded.
    #[error("Failed to encode control message: {0}")]
    Encode(#[from] serde_json::Error),

    /// A payload could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Reconnecting failed too many times in a row.
    #[error("Feed unavailable after {attempts} reconnect attempts: {last_error}")]
    RetriesExhausted {
        /// Consecutive attempts made.
        attempts: u32,
        /// Description of the last failure.
        last_error: String,
    },
}

/// Authenticated, subscribed connection to the trade feed.
pub struct FeedClient {
    pub(crate) config: FeedConfig,
    pub(crate) socket: FeedSocket,
}

impl std::fmt::Debug for FeedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FeedClient {
    /// Connects to the feed, authenticates, and subscribes to the trade
    /// channel for the configured symbol.
    ///
    /// The first connection is not retried.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or a control
    /// message cannot be sent.
    pub async fn connect(config: FeedConfig) -> Result<Self, FeedError> {
        let socket = open(&config).await?;
        Ok(Self { config, socket })
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &FeedConfig {
        &self.config
    }
}

/// Opens one connection and sends the `auth` and `subscribe` messages.
pub(crate) async fn open(config: &FeedConfig) -> Result<FeedSocket, FeedError> {
    let connecting = connect_async(config.url.as_str());
    let (mut socket, _response) = tokio::time::timeout(config.connect_timeout, connecting)
        .await
        .map_err(|_| FeedError::ConnectTimeout {
            url: config.url.clone(),
            timeout: config.connect_timeout,
        })?
        .map_err(|e| FeedError::Connect {
            url: config.url.clone(),
            source: Box::new(e),
        })?;
    debug!(url = %config.url, "Feed connected");

    let channel = config.channel();
    for message in [
        ControlMessage::auth(config.auth_token.as_str()),
        ControlMessage::subscribe(channel.as_str()),
    ] {
        let action = message.action.as_str();
        socket
            .send(Message::text(message.to_json()?))
            .await
            .map_err(|e| FeedError::Send {
                action,
                source: Box::new(e),
            })?;
    }
    debug!(%channel, "Feed subscribed");

    Ok(socket)
}
