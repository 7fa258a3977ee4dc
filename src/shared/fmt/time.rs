//! Bar open-time formatting.

use chrono::{DateTime, TimeZone};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format epoch milliseconds in the given time zone. Out-of-range values render as `-`.
pub fn display_in<Tz: TimeZone>(millis: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::from_timestamp_millis(millis) {
        Some(utc) => utc.with_timezone(tz).format(TIME_FORMAT).to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_display_utc() {
        assert_eq!(display_in(1_704_067_200_000, &Utc), "2024-01-01 00:00:00");
    }

    #[test]
    fn test_display_fixed_offset() {
        let tz = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(display_in(1_704_067_260_000, &tz), "2024-01-01 01:01:00");
    }

    #[test]
    fn test_display_out_of_range() {
        assert_eq!(display_in(i64::MAX, &Utc), "-");
    }
}
