//! Series state — the single ordered sequence of bars for one selection.
//!
//! Two writers exist: the historical loader (full replace) and the live
//! reconciler (merge-and-publish). Every write builds a new [`Series`] and
//! swaps it in behind an `Arc`, so a snapshot handed to a reader never changes.

use super::window::{max_bars, retention_floor};
use super::Bar;
use crate::shared::{Interval, Range};
use std::sync::Arc;

/// Bars sorted ascending by `open_time`, with unique `open_time`s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Series {
    bars: Vec<Bar>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a historical page. Drops bars before `window_start`
    /// (the source may return boundary-inclusive extras) and keeps the
    /// source's ascending order.
    pub fn from_history(bars: Vec<Bar>, window_start: i64) -> Self {
        Self {
            bars: bars
                .into_iter()
                .filter(|b| b.open_time >= window_start)
                .collect(),
        }
    }

    /// Build from arbitrary bars: sorts by `open_time`, later duplicates win.
    pub fn from_bars(bars: Vec<Bar>) -> Self {
        let mut sorted: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match sorted.iter_mut().find(|b| b.open_time == bar.open_time) {
                Some(existing) => *existing = bar,
                None => sorted.push(bar),
            }
        }
        sorted.sort_by_key(|b| b.open_time);
        Self { bars: sorted }
    }

    /// Merge one bar update.
    ///
    /// 1. Evict every bar older than `floor`.
    /// 2. Replace the bar with the same `open_time`, or append.
    /// 3. Re-sort ascending.
    /// 4. Keep only the newest `max_bars`.
    ///
    /// An update that is itself older than `floor` is discarded after eviction.
    pub fn merged(&self, bar: Bar, floor: i64, max_bars: usize) -> Series {
        let mut next: Vec<Bar> = self
            .bars
            .iter()
            .filter(|b| b.open_time >= floor)
            .cloned()
            .collect();

        if bar.open_time >= floor {
            match next.iter_mut().find(|b| b.open_time == bar.open_time) {
                Some(existing) => *existing = bar,
                None => next.push(bar),
            }
        }

        next.sort_by_key(|b| b.open_time);

        if next.len() > max_bars {
            let excess = next.len() - max_bars;
            next.drain(..excess);
        }

        Series { bars: next }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bar> {
        self.bars.iter()
    }

    pub fn get(&self, open_time: i64) -> Option<&Bar> {
        self.bars
            .binary_search_by_key(&open_time, |b| b.open_time)
            .ok()
            .map(|idx| &self.bars[idx])
    }

    pub fn latest(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn oldest(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Strictly ascending `open_time`s (sorted and unique).
    pub fn is_ordered(&self) -> bool {
        self.bars.windows(2).all(|w| w[0].open_time < w[1].open_time)
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Bar;
    type IntoIter = std::slice::Iter<'a, Bar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}

/// Published series for the current selection.
///
/// The app owns instances of this type. Readers take `Arc` snapshots via [`get`](Self::get).
#[derive(Debug, Clone, Default)]
pub struct SeriesState {
    current: Arc<Series>,
}

impl SeriesState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only snapshot of the current series.
    pub fn get(&self) -> Arc<Series> {
        Arc::clone(&self.current)
    }

    /// Replace everything with a loaded historical page.
    pub fn replace(&mut self, bars: Vec<Bar>, window_start: i64) {
        self.current = Arc::new(Series::from_history(bars, window_start));
    }

    /// Drop all bars (reseed start, or a failed load).
    pub fn clear(&mut self) {
        self.current = Arc::new(Series::new());
    }

    /// Merge one live update against the window for `interval`/`range` at `now`,
    /// then publish the result.
    pub fn merge(&mut self, bar: Bar, interval: Interval, range: Range, now: i64) {
        let floor = retention_floor(range, now);
        let cap = max_bars(interval, range);
        self.current = Arc::new(self.current.merged(bar, floor, cap));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rust_decimal::Decimal;

    fn bar(t: i64, close: i64) -> Bar {
        Bar {
            open_time: t,
            open: Decimal::from(close),
            high: Decimal::from(close),
            low: Decimal::from(close),
            close: Decimal::from(close),
            volume: Decimal::ONE,
        }
    }

    fn closes(series: &Series) -> Vec<(i64, Decimal)> {
        series.iter().map(|b| (b.open_time, b.close)).collect()
    }

    #[test]
    fn test_merge_replaces_existing_bar() {
        let series = Series::from_bars(vec![bar(100, 10), bar(200, 12)]);
        let next = series.merged(bar(200, 13), 0, 10);
        assert_eq!(
            closes(&next),
            vec![(100, Decimal::from(10)), (200, Decimal::from(13))]
        );
    }

    #[test]
    fn test_merge_appends_then_truncates_oldest() {
        let series = Series::from_bars(vec![bar(100, 10)]);
        let next = series.merged(bar(200, 11), 0, 1);
        assert_eq!(closes(&next), vec![(200, Decimal::from(11))]);
    }

    #[test]
    fn test_merge_out_of_order_delivery_is_sorted() {
        let series = Series::from_bars(vec![bar(100, 1), bar(300, 3)]);
        let next = series.merged(bar(200, 2), 0, 10);
        let times: Vec<i64> = next.iter().map(|b| b.open_time).collect();
        assert_eq!(times, vec![100, 200, 300]);
    }

    #[test]
    fn test_merge_evicts_below_floor_on_duplicate_update() {
        let series = Series::from_bars(vec![bar(100, 1), bar(200, 2), bar(300, 3)]);
        let next = series.merged(bar(300, 4), 250, 10);
        assert_eq!(closes(&next), vec![(300, Decimal::from(4))]);
    }

    #[test]
    fn test_merge_evicts_below_floor_on_new_update() {
        let series = Series::from_bars(vec![bar(100, 1), bar(200, 2)]);
        let next = series.merged(bar(300, 3), 150, 10);
        let times: Vec<i64> = next.iter().map(|b| b.open_time).collect();
        assert_eq!(times, vec![200, 300]);
    }

    #[test]
    fn test_merge_keeps_bar_exactly_at_floor() {
        let series = Series::from_bars(vec![bar(100, 1)]);
        let next = series.merged(bar(200, 2), 100, 10);
        assert_eq!(next.len(), 2);
    }

    #[test]
    fn test_merge_discards_update_older_than_floor() {
        let series = Series::from_bars(vec![bar(500, 5)]);
        let next = series.merged(bar(100, 1), 400, 10);
        assert_eq!(closes(&next), vec![(500, Decimal::from(5))]);
    }

    #[test]
    fn test_merge_keeps_bar_ahead_of_local_clock() {
        // Exchange clock ahead of ours: the newest bar opens after `now`.
        let now = 10_000;
        let floor = now - 5_000;
        let series = Series::from_bars(vec![bar(9_000, 1)]);
        let next = series.merged(bar(11_000, 2), floor, 10);
        assert_eq!(next.latest().unwrap().open_time, 11_000);
        assert_eq!(next.len(), 2);
    }

    #[test]
    fn test_from_history_filters_before_start() {
        let series = Series::from_history(vec![bar(50, 1), bar(100, 2), bar(150, 3)], 100);
        let times: Vec<i64> = series.iter().map(|b| b.open_time).collect();
        assert_eq!(times, vec![100, 150]);
    }

    #[test]
    fn test_get_by_open_time() {
        let series = Series::from_bars(vec![bar(100, 1), bar(200, 2)]);
        assert_eq!(series.get(200).unwrap().close, Decimal::from(2));
        assert!(series.get(150).is_none());
    }

    #[test]
    fn test_length_change_rules() {
        let series = Series::from_bars((0..5).map(|i| bar(i * 60, i)).collect());
        assert_eq!(series.merged(bar(120, 99), 0, 100).len(), series.len());
        assert_eq!(series.merged(bar(600, 99), 0, 100).len(), series.len() + 1);
    }

    #[test]
    fn test_randomized_merges_preserve_invariants() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..50 {
            let cap = rng.gen_range(1..40);
            let mut series = Series::new();
            let mut floor = 0i64;
            for _ in 0..300 {
                if rng.gen_bool(0.1) {
                    floor += rng.gen_range(0..5) * 60;
                }
                let t = (floor / 60 + rng.gen_range(-3..30)) * 60;
                let before: Vec<i64> = series
                    .iter()
                    .filter(|b| b.open_time >= floor)
                    .map(|b| b.open_time)
                    .collect();

                series = series.merged(bar(t, rng.gen_range(1..1000)), floor, cap);

                assert!(series.len() <= cap);
                assert!(series.is_ordered());
                assert!(series.iter().all(|b| b.open_time >= floor));
                if t >= floor && before.len() < cap {
                    let expected = if before.contains(&t) {
                        before.len()
                    } else {
                        before.len() + 1
                    };
                    assert_eq!(series.len(), expected);
                }
            }
        }
    }

    #[test]
    fn test_series_state_snapshots_are_immutable() {
        let mut state = SeriesState::new();
        state.replace(vec![bar(0, 1)], 0);
        let snapshot = state.get();
        state.merge(bar(60_000, 2), Interval::Minute1, Range::Hour1, 60_000);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(state.get().len(), 2);
    }

    #[test]
    fn test_series_state_merge_uses_window_cap() {
        let mut state = SeriesState::new();
        let now = 10 * 3_600_000;
        for i in 0..100 {
            let t = now - 3_600_000 + i * 60_000;
            state.merge(bar(t, i), Interval::Minute1, Range::Hour1, now);
        }
        let series = state.get();
        assert_eq!(series.len(), 60);
        assert_eq!(series.latest().unwrap().open_time, now - 3_600_000 + 99 * 60_000);
    }

    #[test]
    fn test_series_state_clear() {
        let mut state = SeriesState::new();
        state.replace(vec![bar(0, 1)], 0);
        state.clear();
        assert!(state.get().is_empty());
    }
}
