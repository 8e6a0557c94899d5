#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/finsight/finsight/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod eodhd;
pub mod error;
pub mod provider;

pub use cache::{CacheStats, MemoryCache, ResponseCache, SqliteCache};
pub use eodhd::{Dividend, EodBar, EodhdClient, Fundamentals, ProviderConfig, SearchResult};
pub use error::{DataError, Result};
pub use provider::MarketDataProvider;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
