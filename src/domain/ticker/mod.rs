//! 24h ticker domain — rolling-window statistics for the summary tile.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod wire;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rolling 24h statistics for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker24h {
    pub symbol: String,
    pub last_price: Decimal,
    pub price_change_percent: Decimal,
    pub high_price: Decimal,
    pub low_price: Decimal,
    /// Base-asset volume.
    pub volume: Decimal,
    pub quote_volume: Decimal,
}

impl Ticker24h {
    /// Flat counts as up.
    pub fn is_up(&self) -> bool {
        self.price_change_percent >= Decimal::ZERO
    }
}
