//! Conversions from wire types to `Bar`.

use super::wire::{RawKline, WsKline, WsKlineEvent};
use super::Bar;
use crate::shared::decimal_from_value;

impl TryFrom<RawKline> for Bar {
    type Error = String;

    fn try_from(raw: RawKline) -> Result<Self, Self::Error> {
        let fields = raw.0;
        if fields.len() < 6 {
            return Err(format!("kline row has {} fields, expected at least 6", fields.len()));
        }

        let open_time = fields[0]
            .as_i64()
            .ok_or_else(|| format!("invalid open time: {}", fields[0]))?;

        Ok(Self {
            open_time,
            open: decimal_from_value(&fields[1])?,
            high: decimal_from_value(&fields[2])?,
            low: decimal_from_value(&fields[3])?,
            close: decimal_from_value(&fields[4])?,
            volume: decimal_from_value(&fields[5])?,
        })
    }
}

impl From<WsKline> for Bar {
    fn from(k: WsKline) -> Self {
        Self {
            open_time: k.open_time,
            open: k.open,
            high: k.high,
            low: k.low,
            close: k.close,
            volume: k.volume,
        }
    }
}

impl From<WsKlineEvent> for Bar {
    fn from(event: WsKlineEvent) -> Self {
        event.kline.into()
    }
}
