//! Live feed connection state and bar-update decoding.
//!
//! A connection moves `Idle → Connecting → Open → Closed`. `Closed` is
//! terminal for that connection; resuming means a fresh connection that
//! starts again from `Idle`.

use super::Bar;
use crate::error::FeedError;
use crate::ws::{Kind, ReadyState, WsEvent};

/// Per-connection lifecycle of the kline stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedState {
    #[default]
    Idle,
    Connecting,
    Open,
    Closed,
}

/// Inputs that move a [`FeedState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSignal {
    Connect,
    HandshakeComplete,
    /// Remote close, transport error or failed handshake.
    Lost,
}

impl FeedState {
    /// Apply a signal. Signals that are not legal from the current state
    /// leave it unchanged.
    pub fn apply(self, signal: FeedSignal) -> FeedState {
        match (self, signal) {
            (FeedState::Idle, FeedSignal::Connect) => FeedState::Connecting,
            (FeedState::Connecting, FeedSignal::HandshakeComplete) => FeedState::Open,
            (FeedState::Connecting | FeedState::Open, FeedSignal::Lost) => FeedState::Closed,
            (state, _) => state,
        }
    }

    /// Map a transport event to the signal it implies, if any.
    pub fn signal_for(event: &WsEvent) -> Option<FeedSignal> {
        match event {
            WsEvent::Connected => Some(FeedSignal::HandshakeComplete),
            WsEvent::Disconnected { .. } => Some(FeedSignal::Lost),
            WsEvent::Message(_) | WsEvent::Error(_) => None,
        }
    }

    /// Whether bar updates are merged in this state.
    pub fn accepts_updates(&self) -> bool {
        matches!(self, FeedState::Open)
    }

    /// Whether a live (or pending) connection exists that must be closed
    /// before another is opened.
    pub fn is_live(&self) -> bool {
        matches!(self, FeedState::Connecting | FeedState::Open)
    }

    /// Label for the connection status badge.
    pub fn status_label(&self) -> &'static str {
        match self {
            FeedState::Connecting => "connecting",
            FeedState::Open => "connected",
            FeedState::Idle | FeedState::Closed => "disconnected",
        }
    }
}

impl From<ReadyState> for FeedState {
    fn from(state: ReadyState) -> Self {
        match state {
            ReadyState::Connecting => FeedState::Connecting,
            ReadyState::Open => FeedState::Open,
            ReadyState::Closing | ReadyState::Closed => FeedState::Closed,
        }
    }
}

impl std::fmt::Display for FeedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.status_label())
    }
}

/// Extract the bar carried by a stream message.
pub fn bar_update(kind: Kind) -> Result<Bar, FeedError> {
    match kind {
        Kind::Kline(event) => Ok(event.into()),
        Kind::Other(event_type) => Err(FeedError::IrrelevantEvent(event_type)),
    }
}
