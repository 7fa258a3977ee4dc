//! Wire types for the 24h ticker endpoint.

use crate::shared::serde_util::decimal_lenient;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Response of `GET /api/v3/ticker/24hr?symbol=`. Unused fields are skipped.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker24hResponse {
    pub symbol: String,
    #[serde(deserialize_with = "decimal_lenient::deserialize")]
    pub last_price: Decimal,
    #[serde(deserialize_with = "decimal_lenient::deserialize")]
    pub price_change_percent: Decimal,
    #[serde(deserialize_with = "decimal_lenient::deserialize")]
    pub high_price: Decimal,
    #[serde(deserialize_with = "decimal_lenient::deserialize")]
    pub low_price: Decimal,
    #[serde(deserialize_with = "decimal_lenient::deserialize")]
    pub volume: Decimal,
    #[serde(deserialize_with = "decimal_lenient::deserialize")]
    pub quote_volume: Decimal,
}
