//! Trade forwarding loop.

use barcast_types::Trade;
use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::client::{FeedClient, FeedError, FeedSocket, open};
use crate::parse::{FeedEvent, decode_events};

/// Why a connection stopped delivering.
enum PumpEnd {
    /// The trade receiver was dropped.
    ReceiverClosed,
    /// The connection closed or failed.
    Disconnected {
        reason: String,
        payloads: u64,
    },
}

impl FeedClient {
    /// Forwards trades to `trades` in arrival order until shutdown is
    /// signalled or the receiver is dropped.
    ///
    /// Status messages are logged and never forwarded. A disconnect triggers
    /// reconnection with exponential backoff; the attempt counter resets once
    /// a new connection delivers a payload.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Decode`] on a malformed payload and
    /// [`FeedError::RetriesExhausted`] when reconnecting keeps failing.
    pub async fn run(
        mut self,
        trades: mpsc::Sender<Trade>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), FeedError> {
        let mut attempts = 0u32;

        loop {
            if *shutdown.borrow() {
                break;
            }

            let end = tokio::select! {
                end = pump(&mut self.socket, &trades) => end?,
                _ = shutdown.changed() => break,
            };

            let (mut last_error, payloads) = match end {
                PumpEnd::ReceiverClosed => {
                    debug!("Trade receiver closed, stopping feed");
                    return Ok(());
                }
                PumpEnd::Disconnected { reason, payloads } => (reason, payloads),
            };
            if payloads > 0 {
                attempts = 0;
            }
            warn!(reason = %last_error, "Feed connection lost");

            loop {
                if attempts >= self.config.max_retries {
                    return Err(FeedError::RetriesExhausted {
                        attempts,
                        last_error,
                    });
                }
                attempts += 1;

                let delay = self.config.backoff_delay(attempts);
                info!(
                    attempt = attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Reconnecting to feed"
                );
                tokio::select! {
                    () = tokio::time::sleep(delay) => {}
                    _ = shutdown.changed() => return Ok(()),
                }

                match open(&self.config).await {
                    Ok(socket) => {
                        self.socket = socket;
                        info!(attempt = attempts, "Feed reconnected");
                        break;
                    }
                    Err(e) => {
                        warn!(attempt = attempts, error = %e, "Reconnect failed");
                        last_error = e.to_string();
                    }
                }
            }
        }

        debug!("Feed shutting down");
        if let Err(e) = self.socket.close(None).await {
            debug!(error = %e, "Error closing feed connection");
        }
        Ok(())
    }
}

async fn pump(
    socket: &mut FeedSocket,
    trades: &mpsc::Sender<Trade>,
) -> Result<PumpEnd, FeedError> {
    let mut payloads = 0u64;

    while let Some(message) = socket.next().await {
        let text = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(frame)) => {
                let reason = frame.map_or_else(
                    || "closed by server".to_string(),
                    |f| format!("closed by server: {} {}", f.code, f.reason),
                );
                return Ok(PumpEnd::Disconnected { reason, payloads });
            }
            Ok(_) => continue,
            Err(e) => {
                return Ok(PumpEnd::Disconnected {
                    reason: e.to_string(),
                    payloads,
                });
            }
        };
        payloads += 1;

        for event in decode_events(&text)? {
            match event {
                FeedEvent::Status(status) => info!(
                    status = status.status.as_deref().unwrap_or("unknown"),
                    message = status.message.as_deref().unwrap_or(""),
                    "Feed status"
                ),
                FeedEvent::Trade(trade) => {
                    if trades.send(trade).await.is_err() {
                        return Ok(PumpEnd::ReceiverClosed);
                    }
                }
            }
        }
    }

    Ok(PumpEnd::Disconnected {
        reason: "stream ended".to_string(),
        payloads,
    })
}
