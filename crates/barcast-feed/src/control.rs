//! Feed endpoint and control messages.

use serde::Serialize;

/// Default endpoint for the 15-minute delayed stocks feed.
pub const DEFAULT_URL: &str = "wss://delayed.polygon.io/stocks";

/// Returns the trade channel name for a symbol.
///
/// # Example
///
/// ```
/// use barcast_feed::trade_channel;
///
/// assert_eq!(trade_channel("aapl"), "T.AAPL");
/// ```
#[must_use]
pub fn trade_channel(symbol: &str) -> String {
    format!("T.{}", symbol.to_uppercase())
}

/// Action carried by a control message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    /// Authenticate the connection.
    Auth,
    /// Subscribe to one or more channels.
    Subscribe,
}

impl ControlAction {
    /// Returns the action as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Subscribe => "subscribe",
        }
    }
}

/// Message sent to the feed once per connection.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ControlMessage {
    /// What the message asks for.
    pub action: ControlAction,
    /// Token for `auth`, channel list for `subscribe`.
    pub params: String,
}

impl ControlMessage {
    /// Creates an authentication message.
    #[must_use]
    pub fn auth(token: impl Into<String>) -> Self {
        Self {
            action: ControlAction::Auth,
            params: token.into(),
        }
    }

    /// Creates a subscription message for the given channels.
    #[must_use]
    pub fn subscribe(channels: impl Into<String>) -> Self {
        Self {
            action: ControlAction::Subscribe,
            params: channels.into(),
        }
    }

    /// Serializes the message to its wire form.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl std::fmt::Debug for ControlMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params = match self.action {
            ControlAction::Auth => "<redacted>",
            ControlAction::Subscribe => self.params.as_str(),
        };
        f.debug_struct("ControlMessage")
            .field("action", &self.action)
            .field("params", &params)
            .finish()
    }
}
