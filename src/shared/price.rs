//! Price parsing.
//!
//! The exchange sends prices and quantities as decimal strings (`"2531.42000000"`).
//! Some proxies re-encode them as JSON numbers, so both forms are accepted.

use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Parse a decimal string.
pub fn parse_decimal(s: &str) -> Result<Decimal, String> {
    let trimmed = s.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|e| format!("invalid decimal {:?}: {}", s, e))
}

/// Parse a decimal from a JSON string or number.
pub fn decimal_from_value(value: &Value) -> Result<Decimal, String> {
    match value {
        Value::String(s) => parse_decimal(s),
        Value::Number(n) => parse_decimal(&n.to_string()),
        other => Err(format!("expected decimal, got {}", other)),
    }
}
