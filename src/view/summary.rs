//! 24h summary tile.

use super::table::Direction;
use crate::domain::ticker::Ticker24h;
use crate::shared::fmt::decimal::{self, PERCENT_DECIMALS, TICKER_PRICE_DECIMALS};
use serde::Serialize;

const ABSENT: &str = "-";

/// Formatted ticker values. Every field renders `-` without a ticker,
/// except the percent which renders empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub symbol: String,
    pub last: String,
    pub change_percent: String,
    pub high: String,
    pub low: String,
    pub volume: String,
    pub quote_volume: String,
    pub direction: Direction,
}

impl Summary {
    pub fn new(symbol: &str, ticker: Option<&Ticker24h>) -> Self {
        match ticker {
            Some(t) => Self {
                symbol: symbol.to_string(),
                last: decimal::display_with_max_decimals(&t.last_price, TICKER_PRICE_DECIMALS),
                change_percent: decimal::percent(&t.price_change_percent),
                high: decimal::display_with_max_decimals(&t.high_price, TICKER_PRICE_DECIMALS),
                low: decimal::display_with_max_decimals(&t.low_price, TICKER_PRICE_DECIMALS),
                volume: decimal::volume(&t.volume),
                quote_volume: decimal::display_with_max_decimals(&t.quote_volume, PERCENT_DECIMALS),
                direction: if t.is_up() { Direction::Up } else { Direction::Down },
            },
            None => Self {
                symbol: symbol.to_string(),
                last: ABSENT.to_string(),
                change_percent: String::new(),
                high: ABSENT.to_string(),
                low: ABSENT.to_string(),
                volume: ABSENT.to_string(),
                quote_volume: ABSENT.to_string(),
                direction: Direction::Up,
            },
        }
    }
}
