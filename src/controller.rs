//! Controller — the single event loop that owns [`ViewState`].
//!
//! Every input (user selection, fetch result, feed event) goes through one
//! unbounded channel and is reduced strictly in order, so the history load
//! and the live merge never race. After each event the new state is
//! published as an `Arc<ViewSnapshot>` on a `watch` channel.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::client::CandlesClient;
use crate::error::SdkError;
use crate::shared::{Interval, Range, Symbol};
use crate::view::{reduce, Effect, Generation, Selection, Transition, ViewEvent, ViewSnapshot, ViewState};
use crate::ws::WsEvent;

/// Current wall clock, epoch milliseconds.
fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// ─── Public handle ───────────────────────────────────────────────────────────

/// Handle to a running controller task.
pub struct Controller {
    events_tx: mpsc::UnboundedSender<ViewEvent>,
    view_rx: watch::Receiver<Arc<ViewSnapshot>>,
    task: Option<JoinHandle<()>>,
}

impl Controller {
    /// Spawn the event loop and seed `selection`. Must be called inside a tokio runtime.
    pub fn spawn(client: CandlesClient, selection: Selection) -> Self {
        let state = ViewState::new(selection, now_ms());
        let (view_tx, view_rx) = watch::channel(Arc::new(state.snapshot()));
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let runtime = Runtime {
            client,
            events_tx: events_tx.clone(),
            view_tx,
            feed: None,
        };

        // Queued before the loop starts, so it is always the first event.
        let _ = events_tx.send(ViewEvent::Start);
        let task = tokio::spawn(runtime.run(state, events_rx));

        Self {
            events_tx,
            view_rx,
            task: Some(task),
        }
    }

    pub fn select_symbol(&self, symbol: Symbol) -> Result<(), SdkError> {
        self.send(ViewEvent::SelectSymbol(symbol))
    }

    pub fn select_interval(&self, interval: Interval) -> Result<(), SdkError> {
        self.send(ViewEvent::SelectInterval(interval))
    }

    pub fn select_range(&self, range: Range) -> Result<(), SdkError> {
        self.send(ViewEvent::SelectRange(range))
    }

    /// Receiver that yields a new snapshot after every processed event.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ViewSnapshot>> {
        self.view_rx.clone()
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<ViewSnapshot> {
        Arc::clone(&self.view_rx.borrow())
    }

    /// Close the feed and stop the loop.
    pub async fn shutdown(mut self) {
        let _ = self.events_tx.send(ViewEvent::Shutdown);
        if let Some(task) = self.task.take() {
            if tokio::time::timeout(Duration::from_secs(10), task).await.is_err() {
                tracing::warn!("Controller did not stop within 10s");
            }
        }
    }

    fn send(&self, event: ViewEvent) -> Result<(), SdkError> {
        self.events_tx
            .send(event)
            .map_err(|_| SdkError::Other("controller stopped".to_string()))
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ─── Event loop ──────────────────────────────────────────────────────────────

/// A live feed forwarder and the means to stop it.
struct FeedHandle {
    generation: Generation,
    close_tx: oneshot::Sender<()>,
}

struct Runtime {
    client: CandlesClient,
    events_tx: mpsc::UnboundedSender<ViewEvent>,
    view_tx: watch::Sender<Arc<ViewSnapshot>>,
    feed: Option<FeedHandle>,
}

impl Runtime {
    async fn run(mut self, mut state: ViewState, mut events_rx: mpsc::UnboundedReceiver<ViewEvent>) {
        while let Some(event) = events_rx.recv().await {
            let stop = matches!(event, ViewEvent::Shutdown);
            log_event(&event);

            let Transition {
                state: next,
                effects,
                dropped,
            } = reduce(state, event, now_ms());
            state = next;

            if let Some(reason) = dropped {
                tracing::debug!(%reason, "Dropped view event");
            }
            for effect in effects {
                self.run_effect(effect).await;
            }

            self.view_tx.send_replace(Arc::new(state.snapshot()));

            if stop {
                break;
            }
        }

        self.close_feed();
        tracing::info!("Controller stopped");
    }

    async fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::FetchHistory {
                generation,
                symbol,
                window,
            } => {
                tracing::info!(
                    generation,
                    symbol = %symbol,
                    interval = %window.interval,
                    range = %window.range,
                    limit = window.max_bars,
                    "Loading history"
                );
                if window.is_narrowed() {
                    tracing::debug!(
                        nominal = window.nominal_bars(),
                        limit = window.max_bars,
                        loaded_until = window.loaded_until(),
                        "Range exceeds the page-size cap; history covers only the oldest bars of the range"
                    );
                }
                let client = self.client.clone();
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let result = client.klines().history(&symbol, &window).await;
                    if let Err(e) = &result {
                        tracing::warn!(generation, symbol = %symbol, "{}", e);
                    }
                    let _ = tx.send(ViewEvent::HistoryLoaded { generation, result });
                });
            }

            Effect::FetchTicker { generation, symbol } => {
                let client = self.client.clone();
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let ticker = match client.ticker().get_24h(&symbol).await {
                        Ok(ticker) => Some(ticker),
                        Err(e) => {
                            tracing::warn!(generation, symbol = %symbol, "Ticker load failed: {}", e);
                            None
                        }
                    };
                    let _ = tx.send(ViewEvent::TickerLoaded { generation, ticker });
                });
            }

            Effect::OpenFeed {
                generation,
                symbol,
                interval,
            } => {
                self.close_feed();
                self.open_feed(generation, &symbol, interval);
            }

            Effect::CloseFeed => self.close_feed(),
        }
    }

    /// Spawn a forwarder that owns the connection and tags every transport
    /// event with `generation`.
    fn open_feed(&mut self, generation: Generation, symbol: &Symbol, interval: Interval) {
        let mut ws = self.client.kline_stream(symbol, interval);
        let tx = self.events_tx.clone();
        let (close_tx, mut close_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            if let Err(e) = ws.connect().await {
                let _ = tx.send(ViewEvent::Feed {
                    generation,
                    event: WsEvent::Disconnected {
                        code: None,
                        reason: e.to_string(),
                    },
                });
                return;
            }

            {
                let mut events = ws.events();
                loop {
                    tokio::select! {
                        _ = &mut close_rx => break,
                        event = events.next() => match event {
                            Some(event) => {
                                if tx.send(ViewEvent::Feed { generation, event }).is_err() {
                                    break;
                                }
                            }
                            None => break,
                        },
                    }
                }
            }

            let _ = ws.disconnect().await;
        });

        self.feed = Some(FeedHandle {
            generation,
            close_tx,
        });
    }

    /// Signal the forwarder to close and move on. The forwarder finishes the
    /// close on its own; anything it sends meanwhile carries a stale
    /// feed generation and is discarded by the reducer.
    fn close_feed(&mut self) {
        let Some(handle) = self.feed.take() else {
            return;
        };
        tracing::info!(generation = handle.generation, "Closing kline stream");
        let _ = handle.close_tx.send(());
    }
}

fn log_event(event: &ViewEvent) {
    match event {
        ViewEvent::SelectSymbol(symbol) => tracing::info!(symbol = %symbol, "Symbol selected"),
        ViewEvent::SelectInterval(interval) => tracing::info!(interval = %interval, "Interval selected"),
        ViewEvent::SelectRange(range) => tracing::info!(range = %range, "Range selected"),
        ViewEvent::Feed {
            generation,
            event: WsEvent::Disconnected { code, reason },
        } => {
            tracing::info!(generation, ?code, reason = %reason, "Kline stream disconnected");
        }
        _ => {}
    }
}
