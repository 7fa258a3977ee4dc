//! Native WebSocket client — `tokio-tungstenite`.
//!
//! One client is one connection to one raw stream:
//! - Background tokio task owns the socket
//! - Protocol pings are answered with pongs
//! - Stream-based event delivery to consumer
//!
//! There is no reconnect. When the connection ends the client emits
//! `WsEvent::Disconnected` and stays closed; a new client is needed to resume.

use std::pin::Pin;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream, Stream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::WsError;
use crate::ws::{parse_message, ReadyState, WsConfig, WsEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ─── Commands from public API to background task ─────────────────────────────

enum Command {
    Disconnect,
}

// ─── Background task state ───────────────────────────────────────────────────

struct TaskState {
    url: String,
    connect_timeout: Duration,
    event_tx: mpsc::Sender<WsEvent>,
    cmd_rx: mpsc::Receiver<Command>,
    ready_state: Arc<AtomicU16>,
}

impl TaskState {
    /// Frames may be dropped when the consumer falls behind.
    fn emit(&self, event: WsEvent) {
        if let Err(e) = self.event_tx.try_send(event) {
            tracing::debug!("Dropping WS event: {}", e);
        }
    }

    /// `Connected` and `Disconnected` always reach the consumer, waiting for
    /// room in the channel if necessary.
    async fn emit_lifecycle(&self, event: WsEvent) {
        if self.event_tx.send(event).await.is_err() {
            tracing::debug!("WS event receiver dropped");
        }
    }

    fn set_ready_state(&self, state: ReadyState) {
        self.ready_state.store(state as u16, Ordering::SeqCst);
    }
}

// ─── Public WsClient ─────────────────────────────────────────────────────────

/// Native WebSocket client for a single Binance raw stream.
///
/// Uses a background tokio task for the connection.
/// The public API communicates with it via mpsc channels.
pub struct WsClient {
    config: WsConfig,
    stream: String,
    cmd_tx: Option<mpsc::Sender<Command>>,
    event_rx: tokio::sync::Mutex<mpsc::Receiver<WsEvent>>,
    event_tx: mpsc::Sender<WsEvent>,
    task_handle: Option<JoinHandle<()>>,
    ready_state: Arc<AtomicU16>,
}

impl WsClient {
    /// Create a client for `stream` (e.g. `ethusdt@kline_1m`). Does not connect yet.
    pub fn new(config: WsConfig, stream: impl Into<String>) -> Self {
        let (event_tx, event_rx) = mpsc::channel(config.event_channel_capacity.max(1));
        Self {
            config,
            stream: stream.into(),
            cmd_tx: None,
            event_rx: tokio::sync::Mutex::new(event_rx),
            event_tx,
            task_handle: None,
            ready_state: Arc::new(AtomicU16::new(ReadyState::Closed as u16)),
        }
    }

    /// Full URL this client connects to.
    pub fn url(&self) -> String {
        self.config.stream_url(&self.stream)
    }

    /// Connect to the stream.
    ///
    /// Spawns the background task and returns immediately; the outcome of the
    /// handshake arrives as `WsEvent::Connected` or `WsEvent::Disconnected`.
    /// Calling this twice on the same client is a no-op.
    pub async fn connect(&mut self) -> Result<(), WsError> {
        if self.cmd_tx.is_some() {
            return Ok(());
        }

        let (cmd_tx, cmd_rx) = mpsc::channel(4);
        self.cmd_tx = Some(cmd_tx);
        self.ready_state.store(ReadyState::Connecting as u16, Ordering::SeqCst);

        let state = TaskState {
            url: self.url(),
            connect_timeout: Duration::from_millis(self.config.connect_timeout_ms),
            event_tx: self.event_tx.clone(),
            cmd_rx,
            ready_state: Arc::clone(&self.ready_state),
        };

        tracing::info!(url = %state.url, "Opening kline stream");
        let handle = tokio::spawn(run_task(state));
        self.task_handle = Some(handle);

        Ok(())
    }

    /// Close the connection.
    ///
    /// Sends a graceful close to the background task and waits for it to finish.
    pub async fn disconnect(&mut self) -> Result<(), WsError> {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(Command::Disconnect).await;
        }

        if let Some(handle) = self.task_handle.take() {
            let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        }

        self.ready_state.store(ReadyState::Closed as u16, Ordering::SeqCst);
        Ok(())
    }

    /// Whether the WebSocket is currently open.
    pub fn is_connected(&self) -> bool {
        self.ready_state() == ReadyState::Open
    }

    /// Current connection state.
    pub fn ready_state(&self) -> ReadyState {
        ReadyState::from(self.ready_state.load(Ordering::SeqCst))
    }

    /// Get a stream of events from the WebSocket connection.
    ///
    /// The returned stream borrows `self`, so it must be dropped
    /// before calling `disconnect()`.
    pub fn events(&self) -> Pin<Box<dyn Stream<Item = WsEvent> + Send + '_>> {
        Box::pin(futures_util::stream::unfold(
            &self.event_rx,
            |rx| async move {
                let mut guard = rx.lock().await;
                guard.recv().await.map(|event| (event, rx))
            },
        ))
    }
}

impl Drop for WsClient {
    fn drop(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
    }
}

// ─── Background task ─────────────────────────────────────────────────────────

async fn run_task(mut state: TaskState) {
    // ── 1. Attempt connection, unless the client gives up first ─────────
    let connected = tokio::select! {
        result = attempt_connect(&state.url, state.connect_timeout) => Some(result),
        _ = state.cmd_rx.recv() => None,
    };

    let (sink, stream) = match connected {
        Some(Ok(parts)) => parts,
        Some(Err(e)) => {
            tracing::error!("WebSocket connection failed: {}", e);
            state.set_ready_state(ReadyState::Closed);
            state
                .emit_lifecycle(WsEvent::Disconnected {
                    code: None,
                    reason: e.to_string(),
                })
                .await;
            return;
        }
        None => {
            tracing::info!(url = %state.url, "Kline stream handshake cancelled");
            state.set_ready_state(ReadyState::Closed);
            return;
        }
    };

    // ── 2. Connected ─────────────────────────────────────────────────────
    state.set_ready_state(ReadyState::Open);
    tracing::info!(url = %state.url, "Kline stream connected");
    state.emit_lifecycle(WsEvent::Connected).await;

    // ── 3. Read until the connection ends ────────────────────────────────
    run_connected(&mut state, sink, stream).await;

    state.set_ready_state(ReadyState::Closed);
}

/// The inner connected loop — runs until the connection breaks or the
/// client asks to close.
async fn run_connected(
    state: &mut TaskState,
    mut sink: SplitSink<WsStream, Message>,
    mut stream: SplitStream<WsStream>,
) {
    loop {
        tokio::select! {
            // ── a) Incoming WS message ───────────────────────────────────
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let text_str: &str = text.as_ref();
                        match parse_message(text_str) {
                            Ok(kind) => state.emit(WsEvent::Message(kind)),
                            Err(e) => {
                                tracing::warn!("Malformed stream frame: {} — raw: {}", e, text_str);
                                state.emit(WsEvent::Error(e.to_string()));
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = extract_close(frame.as_ref());
                        tracing::info!(code, reason = %reason, "Kline stream closed by server");
                        state
                            .emit_lifecycle(WsEvent::Disconnected {
                                code: Some(code),
                                reason,
                            })
                            .await;
                        return;
                    }
                    Some(Ok(_)) => {} // Pong, Binary, Frame — ignore
                    Some(Err(e)) => {
                        let reason = e.to_string();
                        tracing::error!("WebSocket error: {}", reason);
                        state
                            .emit_lifecycle(WsEvent::Disconnected {
                                code: None,
                                reason,
                            })
                            .await;
                        return;
                    }
                    None => {
                        state
                            .emit_lifecycle(WsEvent::Disconnected {
                                code: None,
                                reason: "Stream ended".into(),
                            })
                            .await;
                        return;
                    }
                }
            }

            // ── b) Command from public API ───────────────────────────────
            cmd = state.cmd_rx.recv() => {
                match cmd {
                    Some(Command::Disconnect) => {
                        state.set_ready_state(ReadyState::Closing);
                        let _ = sink.send(Message::Close(Some(CloseFrame {
                            code: CloseCode::Normal,
                            reason: "Client disconnect".into(),
                        }))).await;
                        tracing::info!(url = %state.url, "Kline stream closed by client");
                        return;
                    }
                    None => {
                        // WsClient dropped — clean exit
                        return;
                    }
                }
            }
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Attempt to establish a WebSocket connection within `timeout`.
async fn attempt_connect(
    url: &str,
    timeout: Duration,
) -> Result<(SplitSink<WsStream, Message>, SplitStream<WsStream>), WsError> {
    let (ws_stream, _) = tokio::time::timeout(timeout, connect_async(url))
        .await
        .map_err(|_| WsError::ConnectionFailed("timeout".to_string()))?
        .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

    Ok(ws_stream.split())
}

/// Extract close code and reason from an optional CloseFrame.
fn extract_close(frame: Option<&CloseFrame>) -> (u16, String) {
    match frame {
        Some(f) => (f.code.into(), f.reason.to_string()),
        None => (1006, "No close frame".into()),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
