//! Configuration: TOML file defaults plus environment overrides.
//!
//! Every section and field has a default, so an empty file (or no file) is a
//! valid configuration. Secrets and paths can be overridden from the
//! environment:
//!
//! - `EODHD_API_TOKEN` sets `provider.api_token`
//! - `FINSIGHT_DATABASE_PATH` sets `database_path`
//! - `FINSIGHT_CACHE_PATH` sets `cache_path`

use crate::error::ConfigError;
use crate::refresh::RefreshConfig;
use crate::universe::{DEFAULT_EXCHANGE, DEFAULT_SYMBOLS, Watchlist};
use finsight_data::ProviderConfig;
use finsight_screener::ScreenerConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable holding the provider token.
pub const ENV_API_TOKEN: &str = "EODHD_API_TOKEN";
/// Environment variable overriding the database path.
pub const ENV_DATABASE_PATH: &str = "FINSIGHT_DATABASE_PATH";
/// Environment variable overriding the response cache path.
pub const ENV_CACHE_PATH: &str = "FINSIGHT_CACHE_PATH";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Market data provider
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Screening pagination bounds
    #[serde(default)]
    pub screener: ScreenerConfig,
    /// Valuation model parameters
    #[serde(default)]
    pub valuation: ValuationConfig,
    /// Refresh pipeline
    #[serde(default)]
    pub refresh: RefreshConfig,
    /// Tickers to refresh
    #[serde(default)]
    pub universe: UniverseConfig,
    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Screening database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// Response cache database file
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            screener: ScreenerConfig::default(),
            valuation: ValuationConfig::default(),
            refresh: RefreshConfig::default(),
            universe: UniverseConfig::default(),
            logging: LoggingConfig::default(),
            database_path: default_database_path(),
            cache_path: default_cache_path(),
        }
    }
}

fn data_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("finsight")
}

fn default_database_path() -> PathBuf {
    data_dir().join("finsight.db")
}

fn default_cache_path() -> PathBuf {
    data_dir().join("cache.db")
}

/// Parameters of the intrinsic value and growth computations.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ValuationConfig {
    /// Current benchmark bond yield, in percent
    #[serde(default = "default_bond_yield")]
    pub bond_yield: f64,
    /// Growth rate used when EPS history yields none, as a fraction
    #[serde(default = "default_growth_rate")]
    pub default_growth_rate: f64,
    /// Span of the EPS and dividend growth comparisons, in years
    #[serde(default = "default_growth_years")]
    pub growth_years: u32,
    /// Short moving average window
    #[serde(default = "default_sma_short")]
    pub sma_short: usize,
    /// Long moving average window; also the minimum price history
    #[serde(default = "default_sma_long")]
    pub sma_long: usize,
}

const fn default_bond_yield() -> f64 {
    4.4
}
const fn default_growth_rate() -> f64 {
    0.05
}
const fn default_growth_years() -> u32 {
    5
}
const fn default_sma_short() -> usize {
    50
}
const fn default_sma_long() -> usize {
    200
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            bond_yield: default_bond_yield(),
            default_growth_rate: default_growth_rate(),
            growth_years: default_growth_years(),
            sma_short: default_sma_short(),
            sma_long: default_sma_long(),
        }
    }
}

/// Ticker list for the refresh pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UniverseConfig {
    /// `SYMBOL` or `SYMBOL.EXCHANGE` entries
    #[serde(default = "default_tickers")]
    pub tickers: Vec<String>,
    /// Exchange for entries without one
    #[serde(default = "default_exchange")]
    pub exchange: String,
}

fn default_tickers() -> Vec<String> {
    DEFAULT_SYMBOLS.iter().map(|s| (*s).to_string()).collect()
}

fn default_exchange() -> String {
    DEFAULT_EXCHANGE.to_string()
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            tickers: default_tickers(),
            exchange: default_exchange(),
        }
    }
}

impl UniverseConfig {
    /// The configured tickers as a watchlist.
    pub fn watchlist(&self) -> Watchlist {
        Watchlist::new(&self.tickers, &self.exchange)
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    /// Load from `path` when given, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml(&text)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Apply overrides from `lookup`, which maps an environment variable name
    /// to its value. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = lookup(ENV_API_TOKEN) {
            self.provider.api_token = token;
        }
        if let Some(path) = lookup(ENV_DATABASE_PATH) {
            self.database_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_CACHE_PATH) {
            self.cache_path = PathBuf::from(path);
        }
    }
}
