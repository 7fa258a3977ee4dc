//! Shared newtypes and utilities used across all domain modules.
//!
//! These types are serialization-transparent: they serialize/deserialize identically
//! to the raw strings the exchange uses (`"ETHUSDT"`, `"1m"`, `"7d"`), so they can be
//! used directly in wire types and URLs.

pub mod fmt;
pub mod price;
pub mod serde_util;

pub use price::{decimal_from_value, parse_decimal};

use crate::error::SdkError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

pub const MS_PER_HOUR: i64 = 3_600_000;
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

// ─── Symbol ──────────────────────────────────────────────────────────────────

/// Newtype for trading pair symbols (e.g. `"ETHUSDT"`). Always uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// Parse and normalize a symbol. Rejects empty and non-alphanumeric input.
    pub fn new(s: &str) -> Result<Self, SdkError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(SdkError::Validation("symbol cannot be empty".to_string()));
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(SdkError::Validation(format!("invalid symbol: {}", trimmed)));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase form used in stream names.
    pub fn stream_name(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Self("ETHUSDT".to_string())
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::new(s)
    }
}

impl Serialize for Symbol {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Symbol::new(&s).map_err(serde::de::Error::custom)
    }
}

// ─── Interval ────────────────────────────────────────────────────────────────

/// Bar interval (bucket duration).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[default]
    #[serde(rename = "1m")]
    Minute1,
    #[serde(rename = "5m")]
    Minute5,
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "30m")]
    Minute30,
    #[serde(rename = "1h")]
    Hour1,
}

impl Interval {
    pub const ALL: [Interval; 5] = [
        Self::Minute1,
        Self::Minute5,
        Self::Minute15,
        Self::Minute30,
        Self::Hour1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minute1 => "1m",
            Self::Minute5 => "5m",
            Self::Minute15 => "15m",
            Self::Minute30 => "30m",
            Self::Hour1 => "1h",
        }
    }

    /// How many bars of this interval fit in one hour.
    pub fn bars_per_hour(&self) -> i64 {
        match self {
            Self::Minute1 => 60,
            Self::Minute5 => 12,
            Self::Minute15 => 4,
            Self::Minute30 => 2,
            Self::Hour1 => 1,
        }
    }

    /// Duration of one bar in milliseconds.
    pub fn millis(&self) -> i64 {
        MS_PER_HOUR / self.bars_per_hour()
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Interval {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| SdkError::Validation(format!("unknown interval: {}", s)))
    }
}

// ─── Range ───────────────────────────────────────────────────────────────────

/// Lookback range shown in the view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Range {
    #[default]
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "7d")]
    Day7,
    #[serde(rename = "15d")]
    Day15,
    #[serde(rename = "30d")]
    Day30,
}

impl Range {
    pub const ALL: [Range; 6] = [
        Self::Hour1,
        Self::Hour4,
        Self::Day1,
        Self::Day7,
        Self::Day15,
        Self::Day30,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hour1 => "1h",
            Self::Hour4 => "4h",
            Self::Day1 => "1d",
            Self::Day7 => "7d",
            Self::Day15 => "15d",
            Self::Day30 => "30d",
        }
    }

    /// Lookback duration in milliseconds.
    pub fn millis(&self) -> i64 {
        match self {
            Self::Hour1 => MS_PER_HOUR,
            Self::Hour4 => 4 * MS_PER_HOUR,
            Self::Day1 => MS_PER_DAY,
            Self::Day7 => 7 * MS_PER_DAY,
            Self::Day15 => 15 * MS_PER_DAY,
            Self::Day30 => 30 * MS_PER_DAY,
        }
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Range {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| SdkError::Validation(format!("unknown range: {}", s)))
    }
}
