//! Wire types for klines (REST + WS).

use crate::shared::serde_util::decimal_lenient;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the REST klines response.
///
/// `[openTime, open, high, low, close, volume, closeTime, quoteVolume, trades, ...]`.
/// Only the first six fields are read; trailing fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawKline(pub Vec<serde_json::Value>);

/// Bar payload nested under `k` in a stream kline event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WsKline {
    #[serde(rename = "t")]
    pub open_time: i64,
    #[serde(rename = "T", default)]
    pub close_time: Option<i64>,
    #[serde(rename = "i", default)]
    pub interval: Option<String>,
    #[serde(rename = "o", deserialize_with = "decimal_lenient::deserialize")]
    pub open: Decimal,
    #[serde(rename = "h", deserialize_with = "decimal_lenient::deserialize")]
    pub high: Decimal,
    #[serde(rename = "l", deserialize_with = "decimal_lenient::deserialize")]
    pub low: Decimal,
    #[serde(rename = "c", deserialize_with = "decimal_lenient::deserialize")]
    pub close: Decimal,
    #[serde(rename = "v", deserialize_with = "decimal_lenient::deserialize")]
    pub volume: Decimal,
    /// Whether this update closes the bar.
    #[serde(rename = "x", default)]
    pub is_final: bool,
}

/// Stream kline event (`"e": "kline"`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WsKlineEvent {
    #[serde(rename = "E", default)]
    pub event_time: Option<i64>,
    #[serde(rename = "s", default)]
    pub symbol: Option<String>,
    #[serde(rename = "k")]
    pub kline: WsKline,
}
