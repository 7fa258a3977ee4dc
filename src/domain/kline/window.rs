//! Time window calculation for a (interval, range) selection.
//!
//! The window is derived, never cached: recompute it whenever the interval,
//! range or symbol changes, and on every live merge (the floor slides with
//! the wall clock).
//!
//! ## Known limitation
//!
//! The historical endpoint returns at most [`ABSOLUTE_CAP`] bars per request.
//! When `range / interval` exceeds that (e.g. 1m bars over 1d = 1440), the
//! retained series is silently narrowed to the cap and the view shows fewer
//! bars than the nominal range promises. [`Window::is_narrowed`] reports it.
//!
//! The request carries `startTime`, so the endpoint answers with the *oldest*
//! `max_bars` bars of the range, ending at [`Window::loaded_until`]. The first
//! live merge appends the current bar and truncates from the front, so the
//! series then holds the loaded bars minus the oldest one plus the live bar,
//! with a gap between `loaded_until` and the live bar's open time.

use crate::shared::{Interval, Range, MS_PER_HOUR};

/// Maximum page size of the historical klines endpoint.
pub const ABSOLUTE_CAP: usize = 1000;

/// Request window and retention cap for one selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Inclusive lower bound, epoch ms (`now - range`).
    pub start: i64,
    /// Upper bound, epoch ms (`now`).
    pub end: i64,
    pub interval: Interval,
    pub range: Range,
    /// Most bars the series may ever retain for this selection.
    pub max_bars: usize,
}

impl Window {
    /// Bars the range would hold without the page-size cap.
    pub fn nominal_bars(&self) -> i64 {
        nominal_bars(self.interval, self.range)
    }

    /// Whether the cap hides part of the nominal range.
    pub fn is_narrowed(&self) -> bool {
        self.nominal_bars() > ABSOLUTE_CAP as i64
    }

    /// Open time past the last bar the capped history request can return.
    /// Equals `end` when the window is not narrowed.
    pub fn loaded_until(&self) -> i64 {
        if self.is_narrowed() {
            self.start + self.max_bars as i64 * self.interval.millis()
        } else {
            self.end
        }
    }
}

fn nominal_bars(interval: Interval, range: Range) -> i64 {
    interval.bars_per_hour() * (range.millis() / MS_PER_HOUR)
}

/// `min(ABSOLUTE_CAP, bars_per_hour * range_hours)`.
pub fn max_bars(interval: Interval, range: Range) -> usize {
    let nominal = nominal_bars(interval, range).max(0) as usize;
    nominal.min(ABSOLUTE_CAP)
}

/// Oldest `open_time` a bar may have and still be retained at `now`.
pub fn retention_floor(range: Range, now: i64) -> i64 {
    now - range.millis()
}

/// Compute the request window for `[now - range, now]`.
pub fn compute_window(interval: Interval, range: Range, now: i64) -> Window {
    Window {
        start: retention_floor(range, now),
        end: now,
        interval,
        range,
        max_bars: max_bars(interval, range),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_704_067_200_000;

    #[test]
    fn test_compute_window_bounds() {
        let w = compute_window(Interval::Minute1, Range::Hour1, NOW);
        assert_eq!(w.end, NOW);
        assert_eq!(w.start, NOW - 3_600_000);
        assert_eq!(w.max_bars, 60);
        assert!(!w.is_narrowed());
    }

    #[test]
    fn test_max_bars_known_values() {
        assert_eq!(max_bars(Interval::Minute1, Range::Hour4), 240);
        assert_eq!(max_bars(Interval::Minute5, Range::Day1), 288);
        assert_eq!(max_bars(Interval::Minute15, Range::Day7), 672);
        assert_eq!(max_bars(Interval::Hour1, Range::Day30), 720);
    }

    #[test]
    fn test_max_bars_capped() {
        assert_eq!(max_bars(Interval::Minute1, Range::Day1), ABSOLUTE_CAP);
        assert_eq!(max_bars(Interval::Minute30, Range::Day30), ABSOLUTE_CAP);

        let w = compute_window(Interval::Minute1, Range::Day1, NOW);
        assert!(w.is_narrowed());
        assert_eq!(w.nominal_bars(), 1440);
    }

    #[test]
    fn test_narrowed_history_covers_oldest_bars() {
        // 1m over 1d: the first 1000 minutes of the range, not the last.
        let w = compute_window(Interval::Minute1, Range::Day1, NOW);
        assert_eq!(w.loaded_until(), w.start + 1000 * 60_000);
        assert_eq!(w.end - w.loaded_until(), 440 * 60_000);

        let full = compute_window(Interval::Hour1, Range::Day30, NOW);
        assert_eq!(full.loaded_until(), full.end);
    }

    #[test]
    fn test_max_bars_never_exceeds_cap_and_is_monotonic_in_range() {
        for interval in Interval::ALL {
            let mut previous = 0;
            for range in Range::ALL {
                let bars = max_bars(interval, range);
                assert!(bars <= ABSOLUTE_CAP, "{interval}/{range} -> {bars}");
                assert!(bars >= previous, "{interval}/{range} decreased");
                previous = bars;
            }
        }
    }

    #[test]
    fn test_window_recomputed_per_now() {
        let a = compute_window(Interval::Minute5, Range::Hour4, NOW);
        let b = compute_window(Interval::Minute5, Range::Hour4, NOW + 60_000);
        assert_eq!(b.start - a.start, 60_000);
        assert_eq!(a.max_bars, b.max_bars);
    }
}
