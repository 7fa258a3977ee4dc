//! Custom serde helpers for exchange wire formats.

/// Deserializes a decimal sent either as a string (`"0.01634790"`) or a JSON number.
pub mod decimal_lenient {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        crate::shared::decimal_from_value(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(deserialize_with = "super::decimal_lenient::deserialize")]
        v: Decimal,
    }

    #[test]
    fn test_decimal_lenient_string_and_number() {
        let a: Wrapper = serde_json::from_str(r#"{"v":"1.25"}"#).unwrap();
        let b: Wrapper = serde_json::from_str(r#"{"v":1.25}"#).unwrap();
        assert_eq!(a.v, Decimal::new(125, 2));
        assert_eq!(b.v, Decimal::new(125, 2));
        assert!(serde_json::from_str::<Wrapper>(r#"{"v":"x"}"#).is_err());
    }
}
