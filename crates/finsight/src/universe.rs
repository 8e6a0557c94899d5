//! The tickers a refresh walks.

use std::fmt;
use std::str::FromStr;

/// Exchange code used when a ticker carries none.
pub const DEFAULT_EXCHANGE: &str = "US";

/// EODHD exchange codes recognised as a `.EXCHANGE` suffix.
///
/// Any other suffix is a share class: `BRK.B` is the symbol `BRK-B`.
pub const EXCHANGES: &[&str] = &[
    "US", "NYSE", "NASDAQ", "BATS", "AMEX", "OTC", "LSE", "IL", "XETRA", "F", "BE", "DU", "HM",
    "MU", "STU", "PA", "AS", "BR", "LS", "MC", "MI", "SW", "VI", "CO", "HE", "ST", "OL", "IR",
    "WAR", "AT", "TO", "V", "NEO", "CN", "MX", "SA", "BA", "SN", "LIM", "JSE", "TA", "HK",
    "SHG", "SHE", "KO", "KQ", "TW", "TWO", "AU", "NZ", "NSE", "BSE", "JK", "KLSE", "BK", "PSE",
    "VN", "KAR", "SG",
];

/// Symbols loaded by the demonstration data set.
pub const DEFAULT_SYMBOLS: [&str; 15] = [
    "AAPL", "GOOGL", "MSFT", "TSLA", "IBM", "KO", "JNJ", "PFE", "WMT", "XOM", "JPM", "DIS",
    "NVDA", "AMZN", "META",
];

/// A symbol listed on an exchange.
///
/// The store is keyed by the bare symbol; the provider wants `SYMBOL.EXCHANGE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticker {
    symbol: String,
    exchange: String,
}

impl Ticker {
    /// Create a ticker.
    pub fn new(symbol: impl Into<String>, exchange: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            exchange: exchange.into().to_uppercase(),
        }
    }

    /// Parse `SYMBOL` or `SYMBOL.EXCHANGE`, defaulting the exchange to `default_exchange`.
    ///
    /// Only a suffix listed in [`EXCHANGES`] is taken as the exchange. Dots
    /// left in the symbol become dashes, the provider's share class spelling.
    pub fn parse(text: &str, default_exchange: &str) -> Self {
        let text = text.trim();
        match text.rsplit_once('.') {
            Some((symbol, exchange))
                if !symbol.is_empty()
                    && EXCHANGES.iter().any(|e| e.eq_ignore_ascii_case(exchange)) =>
            {
                Self::new(symbol.replace('.', "-"), exchange)
            }
            _ => Self::new(text.replace('.', "-"), default_exchange),
        }
    }

    /// Bare symbol, as stored.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Exchange code.
    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    /// Provider code, `SYMBOL.EXCHANGE`.
    pub fn code(&self) -> String {
        format!("{}.{}", self.symbol, self.exchange)
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.symbol, self.exchange)
    }
}

impl FromStr for Ticker {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s, DEFAULT_EXCHANGE))
    }
}

/// Trait for ticker universes.
pub trait Universe {
    /// Every ticker in the universe.
    fn tickers(&self) -> Vec<Ticker>;

    /// Check if a symbol is in the universe.
    fn contains(&self, symbol: &str) -> bool {
        self.tickers()
            .iter()
            .any(|t| t.symbol().eq_ignore_ascii_case(symbol))
    }

    /// Get the number of tickers.
    fn size(&self) -> usize {
        self.tickers().len()
    }
}

/// An explicit, ordered list of tickers without duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watchlist {
    tickers: Vec<Ticker>,
}

impl Watchlist {
    /// Build from `SYMBOL` or `SYMBOL.EXCHANGE` strings. Later duplicates are dropped.
    pub fn new<I, S>(entries: I, default_exchange: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tickers: Vec<Ticker> = Vec::new();
        for entry in entries {
            let entry = entry.as_ref();
            if entry.trim().is_empty() {
                continue;
            }
            let ticker = Ticker::parse(entry, default_exchange);
            if !tickers.contains(&ticker) {
                tickers.push(ticker);
            }
        }
        Self { tickers }
    }

    /// Tickers in list order.
    pub fn as_slice(&self) -> &[Ticker] {
        &self.tickers
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

impl Default for Watchlist {
    fn default() -> Self {
        Self::new(DEFAULT_SYMBOLS, DEFAULT_EXCHANGE)
    }
}

impl Universe for Watchlist {
    fn tickers(&self) -> Vec<Ticker> {
        self.tickers.clone()
    }
}
