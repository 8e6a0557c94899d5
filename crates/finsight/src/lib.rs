#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/finsight/finsight/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod refresh;
pub mod universe;

// Re-export member crates
pub use finsight_data as data;
pub use finsight_screener as screener;
pub use finsight_valuation as valuation;

pub use config::{Config, LoggingConfig, UniverseConfig, ValuationConfig};
pub use error::{ConfigError, RefreshError};
pub use refresh::{RefreshConfig, RefreshReport, RefreshSchedule, Refresher, TickerFailure};
pub use universe::{Ticker, Universe, Watchlist};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
