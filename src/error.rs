//! Unified error types.

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("WebSocket error: {0}")]
    Ws(#[from] WsError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    Other(String),
}

/// HTTP-layer errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Timeout")]
    Timeout,

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

/// Historical load failure. The series is reset to empty when this is reported.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("history load failed: {0}")]
    Http(#[from] HttpError),

    #[error("history load failed: {0}")]
    Malformed(String),
}

/// WebSocket errors.
#[derive(Error, Debug)]
pub enum WsError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

/// Reasons a live-feed input was dropped. Never surfaced to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    #[error("ignored event type: {0}")]
    IrrelevantEvent(String),

    #[error("stale result: generation {received} (current {current})")]
    StaleResult { received: u64, current: u64 },

    #[error("feed not open")]
    NotOpen,
}
