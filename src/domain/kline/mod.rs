//! Kline domain — OHLCV bars, time windows, the retained series and live reconciliation.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod feed;
pub mod state;
pub mod window;
pub mod wire;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use state::{Series, SeriesState};

/// One OHLCV record for a fixed time bucket, keyed by `open_time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    /// Bucket start, Unix epoch milliseconds. Unique within a series.
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}
