//! EODHD market data access.
//!
//! The client covers the endpoints the refresh pipeline needs:
//! - End-of-day price history (`eod/{ticker}`)
//! - Raw fundamentals (`fundamentals/{ticker}`)
//! - Dividend history (`div/{ticker}`)
//! - Symbol search (`search`)
//!
//! # Example
//!
//! ```no_run
//! use finsight_data::{EodhdClient, ProviderConfig, SqliteCache};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProviderConfig {
//!         api_token: "demo".to_string(),
//!         ..ProviderConfig::default()
//!     };
//!     let cache = Arc::new(SqliteCache::new("cache.db")?);
//!     let client = EodhdClient::new(&config)?.with_cache(cache);
//!
//!     let bars = client.fetch_eod("AAPL.US", None, None).await?;
//!     println!("Fetched {} bars", bars.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod fundamentals;
pub mod types;

pub use client::{EodhdClient, ProviderConfig};
pub use fundamentals::Fundamentals;
pub use types::{Dividend, EodBar, SearchResult};
