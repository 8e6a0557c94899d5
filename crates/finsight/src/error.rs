//! Error types for configuration and the refresh pipeline.

use finsight_data::DataError;
use finsight_screener::ScreenerError;
use finsight_valuation::ValuationError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to refresh one ticker.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// Provider or cache failure
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// A metric could not be computed
    #[error("Valuation error: {0}")]
    Valuation(#[from] ValuationError),

    /// Writing to the store failed
    #[error("Store error: {0}")]
    Store(#[from] ScreenerError),

    /// Not enough price history for the long moving average
    #[error("Not enough EOD data for {ticker}: need {required} bars, got {available}")]
    InsufficientHistory {
        /// Ticker
        ticker: String,
        /// Bars required
        required: usize,
        /// Bars returned
        available: usize,
    },

    /// A fundamentals item the metrics depend on is absent
    #[error("Missing {item} for {ticker}")]
    MissingFinancials {
        /// Ticker
        ticker: String,
        /// What was missing
        item: String,
    },
}

/// Failure to load configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`crate::Config`]
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
