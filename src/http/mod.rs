//! HTTP client layer — `BinanceHttp` with per-endpoint retry policies.

pub mod client;
pub mod retry;

pub use client::BinanceHttp;
pub use retry::{RetryConfig, RetryPolicy};
