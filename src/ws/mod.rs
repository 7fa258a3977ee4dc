//! WebSocket layer — inbound messages, events, config.
//!
//! The transport lives in `native.rs` (`ws-native` feature, `tokio-tungstenite`).
//! This module defines the shared message/event types so the reducer can
//! consume feed events without depending on the transport.

#[cfg(feature = "ws-native")]
pub mod native;

use crate::domain::kline::wire::WsKlineEvent;
use crate::error::WsError;
use crate::shared::{Interval, Symbol};
use serde_json::Value;

// ─── Inbound messages ────────────────────────────────────────────────────────

/// The type of an inbound stream message, keyed by its `e` field.
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    /// `"e": "kline"` — an update to the open (or just closed) bar.
    Kline(WsKlineEvent),
    /// Any other event type. Carried so callers can log what they ignore.
    Other(String),
}

impl Kind {
    /// Event type name as sent on the wire.
    pub fn event_type(&self) -> &str {
        match self {
            Kind::Kline(_) => "kline",
            Kind::Other(e) => e,
        }
    }
}

/// Parse one text frame.
///
/// Unknown event types are not an error; a frame that is not a JSON object,
/// or a kline event with missing or unparseable fields, is.
pub fn parse_message(text: &str) -> Result<Kind, WsError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| WsError::DeserializationError(e.to_string()))?;

    let event_type = value
        .get("e")
        .and_then(Value::as_str)
        .ok_or_else(|| WsError::DeserializationError("missing event type".into()))?;

    match event_type {
        "kline" => serde_json::from_value::<WsKlineEvent>(value)
            .map(Kind::Kline)
            .map_err(|e| WsError::DeserializationError(e.to_string())),
        other => Ok(Kind::Other(other.to_string())),
    }
}

// ─── Ready state ─────────────────────────────────────────────────────────────

/// Transport-level connection state, stored as a `u16` in an atomic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ReadyState {
    Connecting = 0,
    Open = 1,
    Closing = 2,
    Closed = 3,
}

impl From<u16> for ReadyState {
    fn from(value: u16) -> Self {
        match value {
            0 => ReadyState::Connecting,
            1 => ReadyState::Open,
            2 => ReadyState::Closing,
            _ => ReadyState::Closed,
        }
    }
}

// ─── WsEvent ─────────────────────────────────────────────────────────────────

/// High-level events emitted by the WS client to the consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum WsEvent {
    /// A parsed message from the server.
    Message(Kind),
    /// Connection established.
    Connected,
    /// Connection ended or could not be established. Terminal for this client.
    Disconnected { code: Option<u16>, reason: String },
    /// A frame that could not be parsed. The connection stays up.
    Error(String),
}

// ─── Config ──────────────────────────────────────────────────────────────────

/// Configuration for the WS client.
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// Raw-stream endpoint; the stream name is appended as a path segment.
    pub url: String,
    pub event_channel_capacity: usize,
    pub connect_timeout_ms: u64,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: crate::network::DEFAULT_WS_URL.to_string(),
            event_channel_capacity: 1024,
            connect_timeout_ms: 30_000,
        }
    }
}

impl WsConfig {
    /// Full URL for a raw stream, e.g. `.../ws/ethusdt@kline_1m`.
    pub fn stream_url(&self, stream: &str) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), stream)
    }
}

/// Stream name for a symbol's klines: `{symbol_lower}@kline_{interval}`.
pub fn kline_stream_name(symbol: &Symbol, interval: Interval) -> String {
    format!("{}@kline_{}", symbol.stream_name(), interval.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    const KLINE: &str = r#"{
        "e":"kline","E":1704067265000,"s":"BTCUSDT",
        "k":{"t":1704067260000,"T":1704067319999,"s":"BTCUSDT","i":"1m",
             "o":"42000.10","c":"42010.00","h":"42015.5","l":"41999.9","v":"12.5","x":false}
    }"#;

    #[test]
    fn test_parse_kline_message() {
        match parse_message(KLINE).unwrap() {
            Kind::Kline(event) => {
                assert_eq!(event.symbol.as_deref(), Some("BTCUSDT"));
                assert_eq!(event.kline.open_time, 1704067260000);
                assert_eq!(event.kline.close, Decimal::new(4201000, 2));
            }
            other => panic!("expected kline, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_other_event_type() {
        let kind = parse_message(r#"{"e":"24hrTicker","s":"BTCUSDT"}"#).unwrap();
        assert_eq!(kind, Kind::Other("24hrTicker".into()));
        assert_eq!(kind.event_type(), "24hrTicker");
    }

    #[test]
    fn test_parse_malformed() {
        assert!(parse_message("not json").is_err());
        assert!(parse_message(r#"{"result":null,"id":1}"#).is_err());
        assert!(parse_message(r#"{"e":"kline","k":{"t":1}}"#).is_err());
    }

    #[test]
    fn test_ready_state_from_u16() {
        assert_eq!(ReadyState::from(0), ReadyState::Connecting);
        assert_eq!(ReadyState::from(1), ReadyState::Open);
        assert_eq!(ReadyState::from(2), ReadyState::Closing);
        assert_eq!(ReadyState::from(3), ReadyState::Closed);
        assert_eq!(ReadyState::from(99), ReadyState::Closed);
    }

    #[test]
    fn test_stream_url() {
        let config = WsConfig {
            url: "wss://stream.binance.com:9443/ws/".into(),
            ..WsConfig::default()
        };
        let symbol = Symbol::new("ethusdt").unwrap();
        let stream = kline_stream_name(&symbol, Interval::Minute15);
        assert_eq!(stream, "ethusdt@kline_15m");
        assert_eq!(
            config.stream_url(&stream),
            "wss://stream.binance.com:9443/ws/ethusdt@kline_15m"
        );
    }
}
