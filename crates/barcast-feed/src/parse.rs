//! Feed payload decoding.

use barcast_types::{STATUS_EVENT, Trade};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Longest payload excerpt kept in a [`DecodeError`].
const PAYLOAD_EXCERPT_CHARS: usize = 256;

/// A payload whose structure could not be trusted.
#[derive(Error, Debug)]
#[error("Malformed feed payload ({source}): {payload}")]
pub struct DecodeError {
    payload: String,
    #[source]
    source: serde_json::Error,
}

impl DecodeError {
    fn new(payload: &str, source: serde_json::Error) -> Self {
        let mut excerpt: String = payload.chars().take(PAYLOAD_EXCERPT_CHARS).collect();
        if excerpt.len() < payload.len() {
            excerpt.push_str("...");
        }
        Self {
            payload: excerpt,
            source,
        }
    }

    /// Returns an excerpt of the offending payload.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

/// Informational control message sent by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct StatusMessage {
    /// Status code such as `connected` or `auth_success`.
    #[serde(default)]
    pub status: Option<String>,
    /// Human-readable detail.
    #[serde(default)]
    pub message: Option<String>,
}

/// One decoded element of a feed payload.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// A trade to aggregate.
    Trade(Trade),
    /// A control message; never aggregated.
    Status(StatusMessage),
}

/// Decodes one feed payload (a JSON array of event objects).
///
/// Status objects that fail to decode are kept as an empty
/// [`StatusMessage`]; any other object must decode as a [`Trade`].
///
/// # Errors
///
/// Returns an error if the payload is not a JSON array or a non-status
/// element is not a valid trade.
pub fn decode_events(payload: &str) -> Result<Vec<FeedEvent>, DecodeError> {
    let values: Vec<Value> =
        serde_json::from_str(payload).map_err(|e| DecodeError::new(payload, e))?;

    values
        .into_iter()
        .map(|value| decode_event(value).map_err(|e| DecodeError::new(payload, e)))
        .collect()
}

fn decode_event(value: Value) -> Result<FeedEvent, serde_json::Error> {
    if value.get("ev").and_then(Value::as_str) == Some(STATUS_EVENT) {
        let status = serde_json::from_value(value).unwrap_or_default();
        return Ok(FeedEvent::Status(status));
    }
    serde_json::from_value(value).map(FeedEvent::Trade)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_trades_in_order() {
        let payload = r#"[
            {"ev":"T","sym":"AAPL","p":145.91,"s":10,"t":1640995265000},
            {"ev":"T","sym":"AAPL","p":145.90,"s":5,"t":1640995266000}
        ]"#;
        let events = decode_events(payload).unwrap();

        assert_eq!(events.len(), 2);
        let FeedEvent::Trade(first) = &events[0] else {
            panic!("expected a trade");
        };
        assert!((first.price - 145.91).abs() < 1e-10);
        let FeedEvent::Trade(second) = &events[1] else {
            panic!("expected a trade");
        };
        assert_eq!(second.size, 5);
    }

    #[test]
    fn test_status_messages_are_separated() {
        let payload = r#"[{"ev":"status","status":"auth_success","message":"authenticated"}]"#;
        let events = decode_events(payload).unwrap();

        assert_eq!(
            events,
            vec![FeedEvent::Status(StatusMessage {
                status: Some("auth_success".to_string()),
                message: Some("authenticated".to_string()),
            })]
        );
    }

    #[test]
    fn test_malformed_status_is_skipped_not_fatal() {
        let payload = r#"[{"ev":"status","status":42}]"#;
        let events = decode_events(payload).unwrap();
        assert_eq!(events, vec![FeedEvent::Status(StatusMessage::default())]);
    }

    #[test]
    fn test_mixed_payload() {
        let payload = r#"[
            {"ev":"status","status":"connected"},
            {"ev":"T","sym":"AAPL","p":1.0,"t":0}
        ]"#;
        let events = decode_events(payload).unwrap();
        assert!(matches!(events[0], FeedEvent::Status(_)));
        assert!(matches!(events[1], FeedEvent::Trade(_)));
    }

    #[test]
    fn test_not_json_is_an_error() {
        let err = decode_events("not json").unwrap_err();
        assert_eq!(err.payload(), "not json");
        assert!(err.to_string().contains("not json"));
    }

    #[test]
    fn test_bad_trade_is_an_error() {
        let payload = r#"[{"ev":"T","sym":"AAPL","p":"abc","t":0}]"#;
        assert!(decode_events(payload).is_err());
    }

    #[test]
    fn test_object_payload_is_an_error() {
        assert!(decode_events(r#"{"ev":"T"}"#).is_err());
    }

    #[test]
    fn test_error_payload_is_truncated() {
        let payload = "x".repeat(1000);
        let err = decode_events(&payload).unwrap_err();
        assert_eq!(err.payload().len(), PAYLOAD_EXCERPT_CHARS + 3);
        assert!(err.payload().ends_with("..."));
    }

    #[test]
    fn test_empty_array() {
        assert!(decode_events("[]").unwrap().is_empty());
    }
}
