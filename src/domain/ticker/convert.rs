use super::wire::Ticker24hResponse;
use super::Ticker24h;

impl From<Ticker24hResponse> for Ticker24h {
    fn from(wire: Ticker24hResponse) -> Self {
        Self {
            symbol: wire.symbol,
            last_price: wire.last_price,
            price_change_percent: wire.price_change_percent,
            high_price: wire.high_price,
            low_price: wire.low_price,
            volume: wire.volume,
            quote_volume: wire.quote_volume,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_ticker_from_wire() {
        let wire: Ticker24hResponse = serde_json::from_str(
            r#"{
                "symbol": "ETHUSDT",
                "priceChange": "-12.50000000",
                "priceChangePercent": "-0.547",
                "weightedAvgPrice": "2270.1",
                "lastPrice": "2271.33000000",
                "highPrice": "2301.00000000",
                "lowPrice": "2250.10000000",
                "volume": "351234.12340000",
                "quoteVolume": "797123456.78900000",
                "openTime": 1704000000000,
                "closeTime": 1704086399999,
                "count": 912345
            }"#,
        )
        .unwrap();

        let ticker = Ticker24h::from(wire);
        assert_eq!(ticker.symbol, "ETHUSDT");
        assert_eq!(ticker.last_price, Decimal::from_str("2271.33").unwrap());
        assert_eq!(ticker.price_change_percent, Decimal::from_str("-0.547").unwrap());
        assert!(!ticker.is_up());
        assert_eq!(ticker.quote_volume, Decimal::from_str("797123456.789").unwrap());
    }

    #[test]
    fn test_ticker_missing_field_rejected() {
        let result = serde_json::from_str::<Ticker24hResponse>(r#"{"symbol":"ETHUSDT","lastPrice":"1"}"#);
        assert!(result.is_err());
    }
}
