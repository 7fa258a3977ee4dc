//! Low-level HTTP client — `BinanceHttp`.
//!
//! One method per REST endpoint. Returns wire types (conversion to domain
//! types happens in the domain sub-clients). Internal to the crate's
//! high-level client, but usable on its own.

use crate::domain::ticker::wire::Ticker24hResponse;
use crate::error::HttpError;
use crate::http::retry::RetryPolicy;
use crate::shared::{Interval, Symbol};

use reqwest::header::RETRY_AFTER;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Low-level HTTP client for the Binance spot REST API.
#[derive(Clone)]
pub struct BinanceHttp {
    base_url: String,
    client: Client,
}

impl BinanceHttp {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(4)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Klines ───────────────────────────────────────────────────────────

    /// `GET /api/v3/klines`. The body is returned untyped so the caller can
    /// report a non-array response as malformed.
    pub async fn get_klines(
        &self,
        symbol: &Symbol,
        interval: Interval,
        start_time: i64,
        end_time: i64,
        limit: usize,
        retry: RetryPolicy,
    ) -> Result<serde_json::Value, HttpError> {
        let url = format!(
            "{}/api/v3/klines?symbol={}&interval={}&startTime={}&endTime={}&limit={}",
            self.base_url,
            urlencoding::encode(symbol.as_str()),
            interval.as_str(),
            start_time,
            end_time,
            limit
        );
        self.get(&url, retry).await
    }

    // ── Ticker ───────────────────────────────────────────────────────────

    /// `GET /api/v3/ticker/24hr` for one symbol.
    pub async fn get_ticker_24h(
        &self,
        symbol: &Symbol,
        retry: RetryPolicy,
    ) -> Result<Ticker24hResponse, HttpError> {
        let url = format!(
            "{}/api/v3/ticker/24hr?symbol={}",
            self.base_url,
            urlencoding::encode(symbol.as_str())
        );
        self.get(&url, retry).await
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: &str, retry: RetryPolicy) -> Result<T, HttpError> {
        let config = match retry.config() {
            Some(config) => config,
            None => return self.do_get(url).await,
        };

        let mut last_error = None;

        for attempt in 0..=config.max_retries {
            match self.do_get::<T>(url).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    let (should_retry, wait) = match &e {
                        HttpError::ServerError { status, .. } => {
                            (config.retryable_statuses.contains(status), None)
                        }
                        HttpError::RateLimited { retry_after_ms } => {
                            (true, retry_after_ms.map(Duration::from_millis))
                        }
                        HttpError::Timeout => (true, None),
                        HttpError::Reqwest(re) => {
                            (re.is_connect() || re.is_timeout() || re.is_request(), None)
                        }
                        _ => (false, None),
                    };

                    if should_retry && attempt < config.max_retries {
                        let delay = wait.unwrap_or_else(|| config.delay_for_attempt(attempt));
                        tracing::debug!(
                            attempt = attempt + 1,
                            max = config.max_retries,
                            delay_ms = delay.as_millis() as u64,
                            "Retrying request to {}",
                            url
                        );
                        futures_timer::Delay::new(delay).await;
                        last_error = Some(e);
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        Err(HttpError::MaxRetriesExceeded {
            attempts: config.max_retries + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn do_get<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        let resp = self.client.get(url).send().await.map_err(from_reqwest)?;
        let status = resp.status();

        if status.is_success() {
            return resp.json::<T>().await.map_err(from_reqwest);
        }

        let retry_after_ms = resp
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after_ms);
        let body_text = resp.text().await.unwrap_or_default();

        Err(status_error(status.as_u16(), body_text, retry_after_ms))
    }
}

fn from_reqwest(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout
    } else {
        HttpError::Reqwest(e)
    }
}

/// `Retry-After` is sent in whole seconds.
fn parse_retry_after_ms(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().map(|secs| secs.saturating_mul(1000))
}

/// Map a non-2xx status to an error. 418 is Binance's IP-ban escalation of 429.
fn status_error(status: u16, body: String, retry_after_ms: Option<u64>) -> HttpError {
    match status {
        404 => HttpError::NotFound(body),
        418 | 429 => HttpError::RateLimited { retry_after_ms },
        400..=499 => HttpError::BadRequest(body),
        _ => HttpError::ServerError { status, body },
    }
}
