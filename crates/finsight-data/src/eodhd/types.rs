//! Response payloads returned by the EODHD endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of price data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EodBar {
    /// Trading date
    pub date: NaiveDate,
    /// Opening price
    #[serde(default)]
    pub open: f64,
    /// Session high
    #[serde(default)]
    pub high: f64,
    /// Session low
    #[serde(default)]
    pub low: f64,
    /// Raw closing price
    pub close: f64,
    /// Close adjusted for splits and dividends
    pub adjusted_close: f64,
    /// Shares traded
    #[serde(default)]
    pub volume: u64,
}

/// A single dividend payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dividend {
    /// Ex-dividend date
    pub date: NaiveDate,
    /// Amount per share
    pub value: f64,
    /// Payment currency
    #[serde(default)]
    pub currency: Option<String>,
}

/// A symbol search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchResult {
    /// Ticker code without exchange suffix
    pub code: String,
    /// Company name
    pub name: String,
    /// Listing exchange
    pub exchange: String,
    /// Country of listing
    #[serde(default)]
    pub country: String,
    /// Instrument type (e.g. "Common Stock")
    #[serde(default, rename = "Type")]
    pub instrument_type: String,
}
