//! Klines sub-client — the historical loader.

use super::window::Window;
use super::wire::RawKline;
use super::Bar;
use crate::client::CandlesClient;
use crate::error::FetchError;
use crate::shared::Symbol;

/// Sub-client for kline operations.
pub struct Klines<'a> {
    pub(crate) client: &'a CandlesClient,
}

impl<'a> Klines<'a> {
    /// Load the bars for `window` in one bounded request.
    ///
    /// Bars that open before `window.start` are dropped; the source order is kept.
    pub async fn history(&self, symbol: &Symbol, window: &Window) -> Result<Vec<Bar>, FetchError> {
        let body = self
            .client
            .http
            .get_klines(
                symbol,
                window.interval,
                window.start,
                window.end,
                window.max_bars,
                self.client.history_retry.clone(),
            )
            .await?;

        let bars = bars_from_body(body, window.start)?;
        tracing::debug!(
            symbol = %symbol,
            interval = %window.interval,
            bars = bars.len(),
            "Loaded kline history"
        );
        Ok(bars)
    }
}

/// Decode a klines response body. Anything but an array of rows is malformed.
pub(crate) fn bars_from_body(body: serde_json::Value, start: i64) -> Result<Vec<Bar>, FetchError> {
    let rows = match body {
        serde_json::Value::Array(rows) => rows,
        _ => return Err(FetchError::Malformed("Unexpected response".to_string())),
    };

    let mut bars = Vec::with_capacity(rows.len());
    for row in rows {
        let raw: RawKline = serde_json::from_value(row)
            .map_err(|e| FetchError::Malformed(format!("invalid kline row: {}", e)))?;
        let bar = Bar::try_from(raw).map_err(FetchError::Malformed)?;
        if bar.open_time >= start {
            bars.push(bar);
        }
    }
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(t: i64, close: &str) -> serde_json::Value {
        json!([t, "1.0", "2.0", "0.5", close, "100.0", t + 59_999, "150.0", 42, "50.0", "75.0", "0"])
    }

    #[test]
    fn test_bars_from_body_filters_before_start() {
        let body = json!([row(0, "1.1"), row(60_000, "1.2"), row(120_000, "1.3")]);
        let bars = bars_from_body(body, 60_000).unwrap();
        let times: Vec<i64> = bars.iter().map(|b| b.open_time).collect();
        assert_eq!(times, vec![60_000, 120_000]);
    }

    #[test]
    fn test_bars_from_body_keeps_source_order() {
        let body = json!([row(120_000, "1.3"), row(60_000, "1.2")]);
        let bars = bars_from_body(body, 0).unwrap();
        assert_eq!(bars[0].open_time, 120_000);
    }

    #[test]
    fn test_bars_from_body_non_array() {
        let err = bars_from_body(json!({"code": -1121, "msg": "Invalid symbol."}), 0).unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
        assert_eq!(err.to_string(), "history load failed: Unexpected response");
    }

    #[test]
    fn test_bars_from_body_bad_row() {
        let err = bars_from_body(json!([[1, "x"]]), 0).unwrap_err();
        assert!(err.to_string().starts_with("history load failed:"));
    }

    #[test]
    fn test_bars_from_body_empty() {
        assert!(bars_from_body(json!([]), 0).unwrap().is_empty());
    }
}
