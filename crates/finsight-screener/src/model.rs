//! Persisted rows and screening results.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-ticker fundamentals and valuation metrics.
///
/// Every metric is optional until a refresh computes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalsRecord {
    /// Ticker, the row key
    pub ticker: String,
    /// Price over trailing EPS
    pub pe_ratio: Option<f64>,
    /// Return on equity
    pub roe: Option<f64>,
    /// Year-over-year profit comparison
    pub yoy_profit: Option<Value>,
    /// Year-over-year turnover comparison
    pub yoy_turnover: Option<Value>,
    /// Label such as `positive`, `negative`, `neutral` or `stable`
    pub earnings_outlook: Option<String>,
    /// When the row was last written
    pub updated_at: Option<DateTime<Utc>>,
    /// Trailing dividend yield
    pub dividend_yield: Option<f64>,
    /// Five-year dividend CAGR
    pub dividend_growth_5y: Option<f64>,
    /// Intrinsic value per share
    pub intrinsic_value: Option<f64>,
    /// Discount of price below intrinsic value
    pub margin_of_safety: Option<f64>,
}

impl FundamentalsRecord {
    /// An empty record for `ticker`.
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            pe_ratio: None,
            roe: None,
            yoy_profit: None,
            yoy_turnover: None,
            earnings_outlook: None,
            updated_at: None,
            dividend_yield: None,
            dividend_growth_5y: None,
            intrinsic_value: None,
            margin_of_safety: None,
        }
    }
}

/// One trading day's close and moving averages for a ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Ticker
    pub ticker: String,
    /// Trading date
    pub date: NaiveDate,
    /// Closing price
    pub close: f64,
    /// 50-day simple moving average
    pub sma50: f64,
    /// 200-day simple moving average
    pub sma200: f64,
}

/// One row of screening output. Missing values read as zero or empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenerResult {
    /// Ticker
    pub ticker: String,
    /// Price over trailing EPS
    pub pe_ratio: f64,
    /// Return on equity
    pub roe: f64,
    /// Most recent close
    pub close: f64,
    /// 50-day average at the most recent close
    pub sma50: f64,
    /// 200-day average at the most recent close
    pub sma200: f64,
    /// Outlook label
    pub earnings_outlook: String,
    /// Trailing dividend yield
    pub dividend_yield: f64,
    /// Five-year dividend CAGR
    pub dividend_growth_5y: f64,
    /// Intrinsic value per share
    pub intrinsic_value: f64,
    /// Discount of price below intrinsic value
    pub margin_of_safety: f64,
}

impl ScreenerResult {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            ticker: row.get(0)?,
            pe_ratio: row.get(1)?,
            roe: row.get(2)?,
            close: row.get(3)?,
            sma50: row.get(4)?,
            sma200: row.get(5)?,
            earnings_outlook: row.get(6)?,
            dividend_yield: row.get(7)?,
            dividend_growth_5y: row.get(8)?,
            intrinsic_value: row.get(9)?,
            margin_of_safety: row.get(10)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_wire_keys() {
        let result = ScreenerResult {
            ticker: "KO".to_string(),
            pe_ratio: 9.7,
            roe: 0.16,
            close: 48.75,
            sma50: 52.2,
            sma200: 55.5,
            earnings_outlook: "positive".to_string(),
            dividend_yield: 0.045,
            dividend_growth_5y: 0.08,
            intrinsic_value: 65.0,
            margin_of_safety: 0.25,
        };

        let value = serde_json::to_value(&result).unwrap();
        let mut keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();

        assert_eq!(
            keys,
            vec![
                "close",
                "dividend_growth_5y",
                "dividend_yield",
                "earnings_outlook",
                "intrinsic_value",
                "margin_of_safety",
                "pe_ratio",
                "roe",
                "sma200",
                "sma50",
                "ticker",
            ]
        );
    }
}
