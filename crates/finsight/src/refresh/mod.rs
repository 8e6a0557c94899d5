//! Nightly refresh: provider data in, screening metrics out.
//!
//! For every ticker the pipeline fetches price history, fundamentals and
//! dividends, derives the metrics, and upserts one price row and one
//! fundamentals row. A failing ticker is logged and recorded in the
//! [`RefreshReport`]; the remaining tickers still run.

mod metrics;
mod schedule;

pub use schedule::RefreshSchedule;

use crate::config::ValuationConfig;
use crate::error::RefreshError;
use crate::universe::Ticker;
use chrono::{Datelike, Days, Months, NaiveDate, Utc};
use finsight_data::MarketDataProvider;
use finsight_screener::{FundamentalsRecord, PricePoint, Store};
use finsight_valuation::{
    Observation, cagr, dividend_yield, intrinsic_value, margin_of_safety, return_on_equity,
    simple_moving_average,
};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Refresh pipeline settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RefreshConfig {
    /// Calendar days of price history requested
    #[serde(default = "default_price_lookback_days")]
    pub price_lookback_days: u64,
    /// Years of dividend history requested
    #[serde(default = "default_dividend_history_years")]
    pub dividend_history_years: u32,
    /// Tickers processed at once; 1 is strictly sequential
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

const fn default_price_lookback_days() -> u64 {
    400
}
const fn default_dividend_history_years() -> u32 {
    10
}
const fn default_concurrency() -> usize {
    1
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            price_lookback_days: default_price_lookback_days(),
            dividend_history_years: default_dividend_history_years(),
            concurrency: default_concurrency(),
        }
    }
}

/// A ticker that could not be refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickerFailure {
    /// Bare symbol
    pub ticker: String,
    /// Rendered error
    pub error: String,
}

/// Outcome of one refresh run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    /// Date the run was evaluated for
    pub as_of: NaiveDate,
    /// Whether the run was skipped by the schedule
    pub idle: bool,
    /// Symbols written to the store, in universe order
    pub updated: Vec<String>,
    /// Symbols that failed, in universe order
    pub failed: Vec<TickerFailure>,
}

impl RefreshReport {
    fn idle(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            idle: true,
            updated: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Tickers attempted.
    pub fn attempted(&self) -> usize {
        self.updated.len() + self.failed.len()
    }
}

/// Refreshes the store from a market data provider.
#[derive(Debug)]
pub struct Refresher<P> {
    provider: Arc<P>,
    store: Arc<Store>,
    valuation: ValuationConfig,
    config: RefreshConfig,
    schedule: RefreshSchedule,
}

impl<P: MarketDataProvider> Refresher<P> {
    /// Create a refresher with the default weekday schedule.
    pub fn new(
        provider: Arc<P>,
        store: Arc<Store>,
        valuation: ValuationConfig,
        config: RefreshConfig,
    ) -> Self {
        Self {
            provider,
            store,
            valuation,
            config,
            schedule: RefreshSchedule::default(),
        }
    }

    /// Replace the schedule.
    pub fn with_schedule(mut self, schedule: RefreshSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Run unless `as_of` falls on an idle day.
    pub async fn run_nightly(&self, tickers: &[Ticker], as_of: NaiveDate) -> RefreshReport {
        if !self.schedule.should_refresh(as_of) {
            info!(%as_of, "skipping nightly refresh: market closed");
            return RefreshReport::idle(as_of);
        }
        self.run(tickers, as_of).await
    }

    /// Refresh every ticker regardless of the schedule.
    pub async fn run(&self, tickers: &[Ticker], as_of: NaiveDate) -> RefreshReport {
        self.run_with_progress(tickers, as_of, |_, _| {}).await
    }

    /// Refresh every ticker, calling `on_ticker` as each one finishes.
    ///
    /// Results arrive in universe order even when `concurrency > 1`.
    pub async fn run_with_progress<F>(
        &self,
        tickers: &[Ticker],
        as_of: NaiveDate,
        mut on_ticker: F,
    ) -> RefreshReport
    where
        F: FnMut(&Ticker, Result<(), &RefreshError>),
    {
        info!(tickers = tickers.len(), %as_of, "starting refresh");

        let mut report = RefreshReport {
            as_of,
            idle: false,
            updated: Vec::with_capacity(tickers.len()),
            failed: Vec::new(),
        };

        let mut results = stream::iter(tickers)
            .map(|ticker| async move { (ticker, self.refresh_ticker(ticker, as_of).await) })
            .buffered(self.config.concurrency.max(1));

        while let Some((ticker, result)) = results.next().await {
            match result {
                Ok(()) => {
                    debug!(ticker = %ticker.symbol(), "updated");
                    on_ticker(ticker, Ok(()));
                    report.updated.push(ticker.symbol().to_string());
                }
                Err(e) => {
                    warn!(ticker = %ticker.symbol(), error = %e, "refresh failed");
                    on_ticker(ticker, Err(&e));
                    report.failed.push(TickerFailure {
                        ticker: ticker.symbol().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            updated = report.updated.len(),
            failed = report.failed.len(),
            "refresh complete"
        );
        report
    }

    /// Fetch, compute and upsert one ticker.
    ///
    /// Nothing is written unless every metric could be computed.
    pub async fn refresh_ticker(
        &self,
        ticker: &Ticker,
        as_of: NaiveDate,
    ) -> Result<(), RefreshError> {
        let code = ticker.code();
        let symbol = ticker.symbol();
        let years = self.valuation.growth_years;

        // Prices and moving averages
        let from = as_of.checked_sub_days(Days::new(self.config.price_lookback_days));
        let bars = self.provider.fetch_eod(&code, from, Some(as_of)).await?;
        if bars.len() < self.valuation.sma_long {
            return Err(RefreshError::InsufficientHistory {
                ticker: symbol.to_string(),
                required: self.valuation.sma_long,
                available: bars.len(),
            });
        }

        let series: Vec<Observation> = bars
            .iter()
            .map(|bar| Observation::new(bar.date, bar.adjusted_close))
            .collect();
        let sma50 = simple_moving_average(&series, self.valuation.sma_short)?;
        let sma200 = simple_moving_average(&series, self.valuation.sma_long)?;
        let latest = series
            .iter()
            .max_by_key(|o| o.date)
            .copied()
            .ok_or_else(|| RefreshError::InsufficientHistory {
                ticker: symbol.to_string(),
                required: self.valuation.sma_long,
                available: 0,
            })?;
        let price = latest.close;

        // Earnings, return on equity and intrinsic value
        let fundamentals = self.provider.fetch_fundamentals(&code).await?;
        let missing = |item: &str| RefreshError::MissingFinancials {
            ticker: symbol.to_string(),
            item: item.to_string(),
        };

        let (eps_period, eps) =
            metrics::latest_eps(&fundamentals).ok_or_else(|| missing("annual EPS"))?;
        let pe_ratio = (eps > 0.0).then(|| price / eps);

        let equity = metrics::equity_inputs(&fundamentals)
            .ok_or_else(|| missing("yearly balance sheet"))?;
        let shareholders_equity = equity
            .equity
            .ok_or_else(|| missing(&format!("stockholder equity for {}", equity.period)))?;
        let net_income = equity
            .net_income
            .ok_or_else(|| missing(&format!("net income for {}", equity.period)))?;
        let roe = return_on_equity(net_income, shareholders_equity)?;

        let past_eps = metrics::eps_years_before(&fundamentals, &eps_period, years).unwrap_or(0.0);
        let mut growth = cagr(past_eps, eps, f64::from(years));
        if growth == 0.0 {
            growth = self.valuation.default_growth_rate;
        }

        let intrinsic = intrinsic_value(eps, growth * 100.0, self.valuation.bond_yield)?;
        let margin = margin_of_safety(intrinsic, price);

        // Dividends
        let dividend_from =
            as_of.checked_sub_months(Months::new(self.config.dividend_history_years * 12));
        let dividends = self
            .provider
            .fetch_dividends(&code, dividend_from, Some(as_of))
            .await?;
        let last_year = as_of.year() - 1;
        let past_year = last_year - i32::try_from(years).unwrap_or(i32::MAX);
        let paid_last = metrics::dividends_in_year(&dividends, last_year);
        let paid_past = metrics::dividends_in_year(&dividends, past_year);

        debug!(
            ticker = %symbol,
            price, sma50, sma200, eps, roe, growth, intrinsic,
            "computed metrics"
        );

        self.store.upsert_price(&PricePoint {
            ticker: symbol.to_string(),
            date: latest.date,
            close: price,
            sma50,
            sma200,
        })?;

        self.store.upsert_fundamentals(&FundamentalsRecord {
            ticker: symbol.to_string(),
            pe_ratio,
            roe: Some(roe),
            yoy_profit: metrics::year_over_year(&fundamentals, "netIncome"),
            yoy_turnover: metrics::year_over_year(&fundamentals, "totalRevenue"),
            earnings_outlook: None,
            updated_at: Some(Utc::now()),
            dividend_yield: Some(dividend_yield(paid_last, price)),
            dividend_growth_5y: Some(cagr(paid_past, paid_last, f64::from(years))),
            intrinsic_value: Some(intrinsic),
            margin_of_safety: Some(margin),
        })?;

        Ok(())
    }
}
