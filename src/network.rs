//! Network URL constants for the Binance public endpoints.

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.binance.com";

/// Default raw-stream WebSocket base URL. The stream name is appended as a path segment.
pub const DEFAULT_WS_URL: &str = "wss://stream.binance.com:9443/ws";
