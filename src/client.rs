//! High-level client — `CandlesClient` with nested sub-client accessors.
//!
//! Each domain has its own sub-client in `domain/<name>/client.rs`.
//! This module keeps the builder and accessor methods.

use crate::domain::kline::client::Klines;
use crate::domain::ticker::client::Ticker;
use crate::error::SdkError;
use crate::http::retry::RetryPolicy;
use crate::http::BinanceHttp;
use crate::shared::{Interval, Symbol};
use crate::ws::WsConfig;

use std::time::Duration;

// Re-export sub-client types for convenience.
pub use crate::domain::kline::client::Klines as KlinesClient;
pub use crate::domain::ticker::client::Ticker as TickerClient;

/// The primary entry point for Binance market data.
///
/// Provides nested sub-client accessors: `client.klines()`, `client.ticker()`.
#[derive(Clone)]
pub struct CandlesClient {
    pub(crate) http: BinanceHttp,
    pub(crate) ws_config: WsConfig,
    pub(crate) history_retry: RetryPolicy,
    pub(crate) ticker_retry: RetryPolicy,
}

impl CandlesClient {
    pub fn builder() -> CandlesClientBuilder {
        CandlesClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn klines(&self) -> Klines<'_> {
        Klines { client: self }
    }

    pub fn ticker(&self) -> Ticker<'_> {
        Ticker { client: self }
    }

    /// WS config for the kline stream.
    ///
    /// Connections are not embedded in the client: each (symbol, interval)
    /// pair gets its own connection whose lifetime the caller manages.
    pub fn ws_config(&self) -> &WsConfig {
        &self.ws_config
    }

    /// Create a native WS client for the kline stream of `symbol` at `interval`.
    #[cfg(feature = "ws-native")]
    pub fn kline_stream(&self, symbol: &Symbol, interval: Interval) -> crate::ws::native::WsClient {
        crate::ws::native::WsClient::new(
            self.ws_config.clone(),
            crate::ws::kline_stream_name(symbol, interval),
        )
    }

    /// Full stream URL for `symbol` at `interval`.
    pub fn kline_stream_url(&self, symbol: &Symbol, interval: Interval) -> String {
        self.ws_config
            .stream_url(&crate::ws::kline_stream_name(symbol, interval))
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct CandlesClientBuilder {
    base_url: String,
    ws_url: String,
    request_timeout: Duration,
    history_retry: RetryPolicy,
    ticker_retry: RetryPolicy,
}

impl Default for CandlesClientBuilder {
    fn default() -> Self {
        Self {
            base_url: crate::network::DEFAULT_API_URL.to_string(),
            ws_url: crate::network::DEFAULT_WS_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            history_retry: RetryPolicy::None,
            ticker_retry: RetryPolicy::Idempotent,
        }
    }
}

impl CandlesClientBuilder {
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn ws_url(mut self, url: &str) -> Self {
        self.ws_url = url.to_string();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Retry policy for the history load. Defaults to no retries.
    pub fn history_retry(mut self, policy: RetryPolicy) -> Self {
        self.history_retry = policy;
        self
    }

    pub fn ticker_retry(mut self, policy: RetryPolicy) -> Self {
        self.ticker_retry = policy;
        self
    }

    pub fn build(self) -> Result<CandlesClient, SdkError> {
        if self.base_url.trim().is_empty() {
            return Err(SdkError::Validation("base_url cannot be empty".to_string()));
        }
        if self.ws_url.trim().is_empty() {
            return Err(SdkError::Validation("ws_url cannot be empty".to_string()));
        }

        Ok(CandlesClient {
            http: BinanceHttp::new(&self.base_url, self.request_timeout)?,
            ws_config: WsConfig {
                url: self.ws_url,
                ..WsConfig::default()
            },
            history_retry: self.history_retry,
            ticker_retry: self.ticker_retry,
        })
    }
}
