//! Decimal formatting with a maximum number of fractional digits.
//!
//! Rounds half away from zero, trims trailing zeros and groups thousands,
//! e.g. `2531.4212345` with 6 digits renders as `2,531.421235`.

use rust_decimal::{Decimal, RoundingStrategy};

/// Fractional digits shown for open/high/low/close.
pub const PRICE_DECIMALS: u32 = 6;

/// Fractional digits shown for bar volume.
pub const VOLUME_DECIMALS: u32 = 4;

/// Fractional digits shown for ticker last/high/low.
pub const TICKER_PRICE_DECIMALS: u32 = 8;

/// Fractional digits shown for percentages and quote volume.
pub const PERCENT_DECIMALS: u32 = 2;

/// Format a `Decimal` with at most `max_decimals` fractional digits.
pub fn display_with_max_decimals(value: &Decimal, max_decimals: u32) -> String {
    let rounded = value.round_dp_with_strategy(max_decimals, RoundingStrategy::MidpointAwayFromZero);
    super::num::display_formatted_string(&rounded.to_string())
}

/// Bar price cell.
pub fn price(value: &Decimal) -> String {
    display_with_max_decimals(value, PRICE_DECIMALS)
}

/// Bar volume cell.
pub fn volume(value: &Decimal) -> String {
    display_with_max_decimals(value, VOLUME_DECIMALS)
}

/// Percentage with a `%` suffix.
pub fn percent(value: &Decimal) -> String {
    format!("{}%", display_with_max_decimals(value, PERCENT_DECIMALS))
}
