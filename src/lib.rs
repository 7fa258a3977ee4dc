//! # Binance Candles
//!
//! Live OHLCV candles for one Binance trading pair: a bounded historical fetch
//! seeds the series, then the kline stream keeps it current.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core** — Types, time windows, series reconciliation, view reducer (always available)
//! 2. **HTTP API** — `BinanceHttp` with per-endpoint retry policies
//! 3. **WebSocket** — `tokio-tungstenite` kline stream client
//! 4. **High-Level Client** — `CandlesClient` with nested sub-clients
//! 5. **Controller** — single event loop owning the view state
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use binance_candles::prelude::*;
//!
//! let client = CandlesClient::builder().build()?;
//! let controller = Controller::spawn(client, Selection::default());
//! let mut view = controller.subscribe();
//!
//! while view.changed().await.is_ok() {
//!     let snapshot = view.borrow().clone();
//!     for row in snapshot.rows() {
//!         println!("{} {}", row.time, row.close);
//!     }
//! }
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes and formatting used across all domains.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions, state.
pub mod domain;

/// View state, pure reducer, table rows, summary tile and CSV export.
pub mod view;

/// Unified error types.
pub mod error;

/// Network URL constants.
pub mod network;

// ── Layer 2: HTTP API ────────────────────────────────────────────────────────

/// HTTP client with retry policies.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 3: WebSocket ───────────────────────────────────────────────────────

/// WebSocket client: inbound messages, events, config.
pub mod ws;

// ── Layer 4: High-Level Client ───────────────────────────────────────────────

/// `CandlesClient` — the primary entry point for REST data.
#[cfg(feature = "http")]
pub mod client;

// ── Layer 5: Controller ──────────────────────────────────────────────────────

/// Event loop that runs the reducer's effects against the network.
#[cfg(all(feature = "http", feature = "ws-native"))]
pub mod controller;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{Interval, Range, Symbol};

    // Domain types — klines
    pub use crate::domain::kline::feed::FeedState;
    pub use crate::domain::kline::window::{compute_window, max_bars, Window, ABSOLUTE_CAP};
    pub use crate::domain::kline::{Bar, Series, SeriesState};

    // Domain types — ticker
    pub use crate::domain::ticker::Ticker24h;

    // View
    pub use crate::view::export::{csv_file_name, to_csv};
    pub use crate::view::summary::Summary;
    pub use crate::view::table::{Direction, TableRow};
    pub use crate::view::{
        reduce, Effect, Generation, Selection, Transition, ViewEvent, ViewSnapshot, ViewState,
    };

    // Errors
    pub use crate::error::{FeedError, FetchError, HttpError, SdkError, WsError};

    // Network
    pub use crate::network::{DEFAULT_API_URL, DEFAULT_WS_URL};

    // HTTP client + sub-clients
    #[cfg(feature = "http")]
    pub use crate::client::{CandlesClient, CandlesClientBuilder, KlinesClient, TickerClient};
    #[cfg(feature = "http")]
    pub use crate::http::retry::{RetryConfig, RetryPolicy};

    // WebSocket types
    pub use crate::ws::{Kind, ReadyState, WsConfig, WsEvent};

    #[cfg(all(feature = "http", feature = "ws-native"))]
    pub use crate::controller::Controller;
}
