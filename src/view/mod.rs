//! View state and its pure reducer.
//!
//! [`ViewState`] holds everything the dashboard shows for one selection.
//! [`reduce`] is the only way to change it: it takes the state, one
//! [`ViewEvent`] and the wall clock, and returns the next state plus the
//! [`Effect`]s the runtime must perform (fetches, opening or closing the
//! feed). Effect results come back as events tagged with a generation
//! token, so late results for an abandoned selection are discarded.

pub mod export;
pub mod summary;
pub mod table;

use crate::domain::kline::feed::{bar_update, FeedSignal, FeedState};
use crate::domain::kline::window::{compute_window, Window};
use crate::domain::kline::{Bar, Series, SeriesState};
use crate::domain::ticker::Ticker24h;
use crate::error::{FeedError, FetchError};
use crate::shared::{Interval, Range, Symbol};
use crate::ws::WsEvent;
use std::sync::Arc;

use summary::Summary;
use table::TableRow;

/// Monotonic reseed counter.
pub type Generation = u64;

// ─── Selection ───────────────────────────────────────────────────────────────

/// The (symbol, interval, range) triple a series belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub symbol: Symbol,
    pub interval: Interval,
    pub range: Range,
}

impl Selection {
    pub fn new(symbol: Symbol, interval: Interval, range: Range) -> Self {
        Self {
            symbol,
            interval,
            range,
        }
    }
}

// ─── Events & effects ────────────────────────────────────────────────────────

/// Inputs to the reducer.
#[derive(Debug)]
pub enum ViewEvent {
    /// Seed the initial selection.
    Start,
    SelectSymbol(Symbol),
    SelectInterval(Interval),
    SelectRange(Range),
    HistoryLoaded {
        generation: Generation,
        result: Result<Vec<Bar>, FetchError>,
    },
    TickerLoaded {
        generation: Generation,
        ticker: Option<Ticker24h>,
    },
    /// A transport event from the connection opened at `generation`.
    Feed {
        generation: Generation,
        event: WsEvent,
    },
    Shutdown,
}

/// Work the runtime performs on the reducer's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchHistory {
        generation: Generation,
        symbol: Symbol,
        window: Window,
    },
    FetchTicker {
        generation: Generation,
        symbol: Symbol,
    },
    /// Close any current connection, then open one tagged with `generation`.
    OpenFeed {
        generation: Generation,
        symbol: Symbol,
        interval: Interval,
    },
    CloseFeed,
}

/// Result of one [`reduce`] step.
#[derive(Debug)]
pub struct Transition {
    pub state: ViewState,
    pub effects: Vec<Effect>,
    /// Why the event was ignored, if it was.
    pub dropped: Option<FeedError>,
}

impl Transition {
    fn new(state: ViewState) -> Self {
        Self {
            state,
            effects: Vec::new(),
            dropped: None,
        }
    }

    fn dropped(state: ViewState, reason: FeedError) -> Self {
        Self {
            state,
            effects: Vec::new(),
            dropped: Some(reason),
        }
    }
}

// ─── ViewState ───────────────────────────────────────────────────────────────

/// Everything shown for the current selection.
#[derive(Debug, Clone)]
pub struct ViewState {
    selection: Selection,
    /// Bumped on every reseed; guards fetch results.
    generation: Generation,
    /// Generation at which the current connection was opened. Range-only
    /// reseeds keep the connection, so this can lag `generation`.
    feed_generation: Generation,
    window: Window,
    series: SeriesState,
    feed: FeedState,
    loading: bool,
    error: Option<String>,
    ticker: Option<Ticker24h>,
}

impl ViewState {
    pub fn new(selection: Selection, now: i64) -> Self {
        let window = compute_window(selection.interval, selection.range, now);
        Self {
            selection,
            generation: 0,
            feed_generation: 0,
            window,
            series: SeriesState::new(),
            feed: FeedState::Idle,
            loading: false,
            error: None,
            ticker: None,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn feed_generation(&self) -> Generation {
        self.feed_generation
    }

    /// Window computed at the last reseed.
    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn series(&self) -> Arc<Series> {
        self.series.get()
    }

    pub fn feed(&self) -> FeedState {
        self.feed
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn ticker(&self) -> Option<&Ticker24h> {
        self.ticker.as_ref()
    }

    /// Immutable view for renderers.
    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            selection: self.selection.clone(),
            generation: self.generation,
            window: self.window,
            series: self.series.get(),
            feed: self.feed,
            loading: self.loading,
            error: self.error.clone(),
            ticker: self.ticker.clone(),
        }
    }

    /// Start a new generation: clear the series and request history and
    /// ticker. With `reconnect`, also replace the feed connection.
    fn reseed(&mut self, now: i64, reconnect: bool) -> Vec<Effect> {
        self.generation += 1;
        self.window = compute_window(self.selection.interval, self.selection.range, now);
        self.series.clear();
        self.loading = true;
        self.error = None;

        let mut effects = vec![
            Effect::FetchHistory {
                generation: self.generation,
                symbol: self.selection.symbol.clone(),
                window: self.window,
            },
            Effect::FetchTicker {
                generation: self.generation,
                symbol: self.selection.symbol.clone(),
            },
        ];

        if reconnect {
            if self.feed.is_live() {
                effects.push(Effect::CloseFeed);
            }
            self.feed_generation = self.generation;
            self.feed = FeedState::Idle.apply(FeedSignal::Connect);
            effects.push(Effect::OpenFeed {
                generation: self.generation,
                symbol: self.selection.symbol.clone(),
                interval: self.selection.interval,
            });
        }

        effects
    }

    fn on_feed_event(&mut self, event: WsEvent, now: i64) -> Option<FeedError> {
        if let Some(signal) = FeedState::signal_for(&event) {
            self.feed = self.feed.apply(signal);
            return None;
        }

        match event {
            WsEvent::Message(kind) => {
                if !self.feed.accepts_updates() {
                    return Some(FeedError::NotOpen);
                }
                match bar_update(kind) {
                    Ok(bar) => {
                        self.series.merge(
                            bar,
                            self.selection.interval,
                            self.selection.range,
                            now,
                        );
                        None
                    }
                    Err(reason) => Some(reason),
                }
            }
            WsEvent::Error(message) => Some(FeedError::MalformedEvent(message)),
            WsEvent::Connected | WsEvent::Disconnected { .. } => None,
        }
    }
}

/// Apply one event at wall-clock time `now` (epoch ms).
pub fn reduce(mut state: ViewState, event: ViewEvent, now: i64) -> Transition {
    match event {
        ViewEvent::Start => {
            let effects = state.reseed(now, true);
            Transition {
                state,
                effects,
                dropped: None,
            }
        }

        ViewEvent::SelectSymbol(symbol) => {
            if symbol == state.selection.symbol {
                return Transition::new(state);
            }
            state.selection.symbol = symbol;
            state.ticker = None;
            let effects = state.reseed(now, true);
            Transition {
                state,
                effects,
                dropped: None,
            }
        }

        ViewEvent::SelectInterval(interval) => {
            if interval == state.selection.interval {
                return Transition::new(state);
            }
            state.selection.interval = interval;
            let effects = state.reseed(now, true);
            Transition {
                state,
                effects,
                dropped: None,
            }
        }

        ViewEvent::SelectRange(range) => {
            if range == state.selection.range {
                return Transition::new(state);
            }
            state.selection.range = range;
            let effects = state.reseed(now, false);
            Transition {
                state,
                effects,
                dropped: None,
            }
        }

        ViewEvent::HistoryLoaded { generation, result } => {
            if generation != state.generation {
                let current = state.generation;
                return Transition::dropped(
                    state,
                    FeedError::StaleResult {
                        received: generation,
                        current,
                    },
                );
            }
            state.loading = false;
            match result {
                Ok(bars) => {
                    state.series.replace(bars, state.window.start);
                    state.error = None;
                }
                Err(e) => {
                    state.series.clear();
                    state.error = Some(e.to_string());
                }
            }
            Transition::new(state)
        }

        ViewEvent::TickerLoaded { generation, ticker } => {
            if generation != state.generation {
                let current = state.generation;
                return Transition::dropped(
                    state,
                    FeedError::StaleResult {
                        received: generation,
                        current,
                    },
                );
            }
            state.ticker = ticker;
            Transition::new(state)
        }

        ViewEvent::Feed { generation, event } => {
            if generation != state.feed_generation {
                let current = state.feed_generation;
                return Transition::dropped(
                    state,
                    FeedError::StaleResult {
                        received: generation,
                        current,
                    },
                );
            }
            let dropped = state.on_feed_event(event, now);
            Transition {
                state,
                effects: Vec::new(),
                dropped,
            }
        }

        ViewEvent::Shutdown => {
            let mut effects = Vec::new();
            if state.feed.is_live() {
                effects.push(Effect::CloseFeed);
                state.feed = state.feed.apply(FeedSignal::Lost);
            }
            Transition {
                state,
                effects,
                dropped: None,
            }
        }
    }
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Immutable copy of the view published to renderers.
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    pub selection: Selection,
    pub generation: Generation,
    pub window: Window,
    pub series: Arc<Series>,
    pub feed: FeedState,
    pub loading: bool,
    pub error: Option<String>,
    pub ticker: Option<Ticker24h>,
}

impl ViewSnapshot {
    /// Table rows, times in the local time zone.
    pub fn rows(&self) -> Vec<TableRow> {
        table::rows(&self.series)
    }

    /// CSV of exactly the rows returned by [`rows`](Self::rows).
    pub fn csv(&self) -> String {
        export::to_csv(&self.rows())
    }

    pub fn csv_file_name(&self) -> String {
        export::csv_file_name(
            &self.selection.symbol,
            self.selection.interval,
            self.selection.range,
        )
    }

    pub fn summary(&self) -> Summary {
        Summary::new(self.selection.symbol.as_str(), self.ticker.as_ref())
    }

    pub fn status_label(&self) -> &'static str {
        self.feed.status_label()
    }

    /// Whether the table should show its "No data" placeholder.
    pub fn shows_placeholder(&self) -> bool {
        self.series.is_empty() && !self.loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::kline::wire::{WsKline, WsKlineEvent};
    use crate::error::HttpError;
    use crate::ws::Kind;
    use rust_decimal::Decimal;

    const NOW: i64 = 1_704_067_200_000;
    const MINUTE: i64 = 60_000;

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

    fn kline(t: i64, close: i64) -> WsEvent {
        WsEvent::Message(Kind::Kline(WsKlineEvent {
            event_time: None,
            symbol: None,
            kline: WsKline {
                open_time: t,
                close_time: None,
                interval: None,
                open: Decimal::from(close),
                high: Decimal::from(close),
                low: Decimal::from(close),
                close: Decimal::from(close),
                volume: Decimal::ONE,
                is_final: false,
            },
        }))
    }

    fn started() -> ViewState {
        let state = ViewState::new(Selection::default(), NOW);
        reduce(state, ViewEvent::Start, NOW).state
    }

    fn open(state: ViewState) -> ViewState {
        let generation = state.feed_generation();
        reduce(
            state,
            ViewEvent::Feed {
                generation,
                event: WsEvent::Connected,
            },
            NOW,
        )
        .state
    }

    #[test]
    fn test_start_requests_history_ticker_and_feed() {
        let t = reduce(ViewState::new(Selection::default(), NOW), ViewEvent::Start, NOW);
        assert_eq!(t.state.generation(), 1);
        assert_eq!(t.state.feed(), FeedState::Connecting);
        assert!(t.state.is_loading());
        assert_eq!(t.effects.len(), 3);
        assert!(matches!(
            &t.effects[0],
            Effect::FetchHistory { generation: 1, window, .. } if window.start == NOW - 3_600_000 && window.max_bars == 60
        ));
        assert!(matches!(t.effects[1], Effect::FetchTicker { generation: 1, .. }));
        assert!(matches!(
            t.effects[2],
            Effect::OpenFeed { generation: 1, interval: Interval::Minute1, .. }
        ));
    }

    #[test]
    fn test_history_replaces_series() {
        let state = started();
        let t = reduce(
            state,
            ViewEvent::HistoryLoaded {
                generation: 1,
                result: Ok(vec![bar(NOW - 2 * 3_600_000, 1), bar(NOW - MINUTE, 2)]),
            },
            NOW,
        );
        assert!(!t.state.is_loading());
        assert_eq!(t.state.series().len(), 1);
        assert!(t.state.error().is_none());
    }

    #[test]
    fn test_history_failure_clears_and_reports() {
        let state = open(started());
        let state = reduce(
            state,
            ViewEvent::Feed {
                generation: 1,
                event: kline(NOW - MINUTE, 5),
            },
            NOW,
        )
        .state;
        assert_eq!(state.series().len(), 1);

        let t = reduce(
            state,
            ViewEvent::HistoryLoaded {
                generation: 1,
                result: Err(FetchError::Http(HttpError::Timeout)),
            },
            NOW,
        );
        assert!(t.state.series().is_empty());
        assert_eq!(t.state.error(), Some("history load failed: Timeout"));
        assert!(t.state.snapshot().shows_placeholder());
    }

    #[test]
    fn test_stale_history_discarded() {
        let state = started();
        let state = reduce(state, ViewEvent::SelectSymbol(Symbol::new("BTCUSDT").unwrap()), NOW).state;
        assert_eq!(state.generation(), 2);

        let t = reduce(
            state,
            ViewEvent::HistoryLoaded {
                generation: 1,
                result: Ok(vec![bar(NOW - MINUTE, 1)]),
            },
            NOW,
        );
        assert_eq!(
            t.dropped,
            Some(FeedError::StaleResult { received: 1, current: 2 })
        );
        assert!(t.state.series().is_empty());
        assert!(t.state.is_loading());
    }

    #[test]
    fn test_symbol_change_closes_and_reopens_feed() {
        let state = open(started());
        let t = reduce(state, ViewEvent::SelectSymbol(Symbol::new("btcusdt").unwrap()), NOW);
        assert_eq!(t.state.feed(), FeedState::Connecting);
        assert_eq!(t.state.feed_generation(), 2);
        assert!(t.state.ticker().is_none());
        assert!(t.effects.contains(&Effect::CloseFeed));
        let close_at = t.effects.iter().position(|e| *e == Effect::CloseFeed).unwrap();
        let open_at = t
            .effects
            .iter()
            .position(|e| matches!(e, Effect::OpenFeed { .. }))
            .unwrap();
        assert!(close_at < open_at);
    }

    #[test]
    fn test_same_selection_is_noop() {
        let state = started();
        let t = reduce(state, ViewEvent::SelectInterval(Interval::Minute1), NOW);
        assert!(t.effects.is_empty());
        assert_eq!(t.state.generation(), 1);
    }

    #[test]
    fn test_range_change_keeps_feed() {
        let state = open(started());
        let t = reduce(state, ViewEvent::SelectRange(Range::Day1), NOW);
        assert_eq!(t.state.generation(), 2);
        assert_eq!(t.state.feed_generation(), 1);
        assert_eq!(t.state.feed(), FeedState::Open);
        assert!(!t.effects.iter().any(|e| matches!(e, Effect::OpenFeed { .. } | Effect::CloseFeed)));
        assert_eq!(t.state.window().max_bars, 1000);

        // the connection from generation 1 still feeds the series
        let t = reduce(
            t.state,
            ViewEvent::Feed {
                generation: 1,
                event: kline(NOW - 5 * 3_600_000, 9),
            },
            NOW,
        );
        assert!(t.dropped.is_none());
        assert_eq!(t.state.series().len(), 1);
    }

    #[test]
    fn test_stale_feed_message_discarded() {
        let state = open(started());
        let state = reduce(state, ViewEvent::SelectInterval(Interval::Minute5), NOW).state;
        let t = reduce(
            state,
            ViewEvent::Feed {
                generation: 1,
                event: kline(NOW - MINUTE, 1),
            },
            NOW,
        );
        assert!(matches!(t.dropped, Some(FeedError::StaleResult { received: 1, current: 2 })));
        assert!(t.state.series().is_empty());
    }

    #[test]
    fn test_updates_ignored_until_open() {
        let state = started();
        let t = reduce(
            state,
            ViewEvent::Feed {
                generation: 1,
                event: kline(NOW - MINUTE, 1),
            },
            NOW,
        );
        assert_eq!(t.dropped, Some(FeedError::NotOpen));
        assert!(t.state.series().is_empty());
    }

    #[test]
    fn test_disconnect_keeps_series() {
        let state = open(started());
        let state = reduce(
            state,
            ViewEvent::Feed {
                generation: 1,
                event: kline(NOW - MINUTE, 1),
            },
            NOW,
        )
        .state;
        let t = reduce(
            state,
            ViewEvent::Feed {
                generation: 1,
                event: WsEvent::Disconnected {
                    code: None,
                    reason: "reset".into(),
                },
            },
            NOW,
        );
        assert_eq!(t.state.feed(), FeedState::Closed);
        assert_eq!(t.state.snapshot().status_label(), "disconnected");
        assert_eq!(t.state.series().len(), 1);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_irrelevant_and_malformed_dropped() {
        let state = open(started());
        let t = reduce(
            state,
            ViewEvent::Feed {
                generation: 1,
                event: WsEvent::Message(Kind::Other("trade".into())),
            },
            NOW,
        );
        assert_eq!(t.dropped, Some(FeedError::IrrelevantEvent("trade".into())));
        let t = reduce(
            t.state,
            ViewEvent::Feed {
                generation: 1,
                event: WsEvent::Error("bad frame".into()),
            },
            NOW,
        );
        assert_eq!(t.dropped, Some(FeedError::MalformedEvent("bad frame".into())));
        assert_eq!(t.state.feed(), FeedState::Open);
    }

    #[test]
    fn test_ticker_guarded_by_generation() {
        let state = started();
        let ticker = Ticker24h {
            symbol: "ETHUSDT".into(),
            last_price: Decimal::ONE,
            price_change_percent: Decimal::ZERO,
            high_price: Decimal::ONE,
            low_price: Decimal::ONE,
            volume: Decimal::ONE,
            quote_volume: Decimal::ONE,
        };
        let t = reduce(
            state,
            ViewEvent::TickerLoaded {
                generation: 0,
                ticker: Some(ticker.clone()),
            },
            NOW,
        );
        assert!(t.state.ticker().is_none());
        let t = reduce(
            t.state,
            ViewEvent::TickerLoaded {
                generation: 1,
                ticker: Some(ticker),
            },
            NOW,
        );
        assert_eq!(t.state.snapshot().summary().last, "1");
    }

    #[test]
    fn test_shutdown_closes_live_feed() {
        let t = reduce(open(started()), ViewEvent::Shutdown, NOW);
        assert_eq!(t.effects, vec![Effect::CloseFeed]);
        assert_eq!(t.state.feed(), FeedState::Closed);

        let t = reduce(t.state, ViewEvent::Shutdown, NOW);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_snapshot_is_immutable() {
        let state = open(started());
        let snapshot = state.snapshot();
        let state = reduce(
            state,
            ViewEvent::Feed {
                generation: 1,
                event: kline(NOW - MINUTE, 1),
            },
            NOW,
        )
        .state;
        assert!(snapshot.series.is_empty());
        assert_eq!(state.series().len(), 1);
        assert_eq!(snapshot.csv_file_name(), "ETHUSDT_1m_1h.csv");
    }
}
