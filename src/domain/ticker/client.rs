//! Ticker sub-client — 24h rolling statistics.

use super::Ticker24h;
use crate::client::CandlesClient;
use crate::error::SdkError;
use crate::shared::Symbol;

/// Sub-client for ticker operations.
pub struct Ticker<'a> {
    pub(crate) client: &'a CandlesClient,
}

impl<'a> Ticker<'a> {
    /// Fetch the 24h ticker, retried per the client's `ticker_retry` policy.
    pub async fn get_24h(&self, symbol: &Symbol) -> Result<Ticker24h, SdkError> {
        let wire = self
            .client
            .http
            .get_ticker_24h(symbol, self.client.ticker_retry.clone())
            .await?;
        Ok(wire.into())
    }
}
