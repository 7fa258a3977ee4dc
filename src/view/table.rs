//! Table rows derived from a series snapshot.
//!
//! Rows are the single source for both the on-screen table and the CSV
//! export, so the two can never disagree.

use crate::domain::kline::{Bar, Series};
use crate::shared::fmt::{decimal, time};
use chrono::TimeZone;
use serde::Serialize;

/// Price direction of a row relative to the previous bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

/// One formatted bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub open_time: i64,
    pub time: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
    pub direction: Direction,
}

impl TableRow {
    fn from_bar<Tz: TimeZone>(bar: &Bar, previous: Option<&Bar>, tz: &Tz) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let direction = match previous {
            Some(prev) if bar.close < prev.close => Direction::Down,
            _ => Direction::Up,
        };

        Self {
            open_time: bar.open_time,
            time: time::display_in(bar.open_time, tz),
            open: decimal::price(&bar.open),
            high: decimal::price(&bar.high),
            low: decimal::price(&bar.low),
            close: decimal::price(&bar.close),
            volume: decimal::volume(&bar.volume),
            direction,
        }
    }

    /// Cells in column order, matching [`COLUMNS`].
    pub fn cells(&self) -> [&str; 6] {
        [
            &self.time,
            &self.open,
            &self.high,
            &self.low,
            &self.close,
            &self.volume,
        ]
    }
}

/// Column headers.
pub const COLUMNS: [&str; 6] = ["Time", "Open", "High", "Low", "Close", "Volume"];

/// Rows for every bar in series order, times rendered in `tz`.
pub fn rows_in<Tz: TimeZone>(series: &Series, tz: &Tz) -> Vec<TableRow>
where
    Tz::Offset: std::fmt::Display,
{
    let bars = series.bars();
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let previous = i.checked_sub(1).map(|p| &bars[p]);
            TableRow::from_bar(bar, previous, tz)
        })
        .collect()
}

/// Rows with times in the local time zone.
pub fn rows(series: &Series) -> Vec<TableRow> {
    rows_in(series, &chrono::Local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn bar(t: i64, close: &str, volume: &str) -> Bar {
        let close = Decimal::from_str(close).unwrap();
        Bar {
            open_time: t,
            open: close,
            high: close,
            low: close,
            close,
            volume: Decimal::from_str(volume).unwrap(),
        }
    }

    #[test]
    fn test_rows_format_and_direction() {
        let series = Series::from_bars(vec![
            bar(1_704_067_200_000, "2281.1000000", "12.50000"),
            bar(1_704_067_260_000, "2281.1", "1234.56789"),
            bar(1_704_067_320_000, "2280.9999995", "0.00004"),
        ]);
        let rows = rows_in(&series, &Utc);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].time, "2024-01-01 00:00:00");
        assert_eq!(rows[0].close, "2,281.1");
        assert_eq!(rows[0].volume, "12.5");
        assert_eq!(rows[0].direction, Direction::Up);

        // equal close counts as up
        assert_eq!(rows[1].direction, Direction::Up);
        assert_eq!(rows[1].volume, "1,234.5679");

        assert_eq!(rows[2].close, "2,281");
        assert_eq!(rows[2].volume, "0");
        assert_eq!(rows[2].direction, Direction::Down);
    }

    #[test]
    fn test_rows_empty_series() {
        assert!(rows_in(&Series::new(), &Utc).is_empty());
    }

    #[test]
    fn test_cells_order() {
        let series = Series::from_bars(vec![bar(0, "1.5", "2")]);
        let row = &rows_in(&series, &Utc)[0];
        assert_eq!(row.cells(), ["1970-01-01 00:00:00", "1.5", "1.5", "1.5", "1.5", "2"]);
    }
}
