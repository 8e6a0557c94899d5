//! Provider abstraction consumed by the refresh pipeline.

use crate::eodhd::{Dividend, EodBar, EodhdClient, Fundamentals};
use crate::error::Result;
use chrono::NaiveDate;
use std::future::Future;

/// Source of prices, fundamentals, and dividend history.
///
/// Implemented by [`EodhdClient`]; tests substitute in-memory fakes.
pub trait MarketDataProvider: Send + Sync {
    /// End-of-day bars for `ticker`, bounded by inclusive dates.
    fn fetch_eod(
        &self,
        ticker: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> impl Future<Output = Result<Vec<EodBar>>> + Send;

    /// The fundamentals document for `ticker`.
    fn fetch_fundamentals(&self, ticker: &str) -> impl Future<Output = Result<Fundamentals>> + Send;

    /// Dividend payments for `ticker`, bounded by inclusive dates.
    fn fetch_dividends(
        &self,
        ticker: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> impl Future<Output = Result<Vec<Dividend>>> + Send;
}

impl MarketDataProvider for EodhdClient {
    async fn fetch_eod(
        &self,
        ticker: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<EodBar>> {
        Self::fetch_eod(self, ticker, from, to).await
    }

    async fn fetch_fundamentals(&self, ticker: &str) -> Result<Fundamentals> {
        Self::fetch_fundamentals(self, ticker).await
    }

    async fn fetch_dividends(
        &self,
        ticker: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Dividend>> {
        Self::fetch_dividends(self, ticker, from, to).await
    }
}
