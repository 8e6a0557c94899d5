//! EODHD API client with response caching and rate limiting.

use crate::cache::ResponseCache;
use crate::eodhd::{Dividend, EodBar, Fundamentals, SearchResult};
use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

/// EODHD API base URL
pub const EODHD_BASE_URL: &str = "https://eodhd.com/api";

/// Connection settings for the market data provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API token appended to every request
    pub api_token: String,
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// How long a fetched response stays cached, in hours
    pub cache_ttl_hours: u64,
    /// Minimum spacing between network requests, in milliseconds
    pub rate_limit_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            base_url: EODHD_BASE_URL.to_string(),
            timeout_secs: 10,
            cache_ttl_hours: 24,
            rate_limit_ms: 100,
        }
    }
}

/// Spaces out requests so the provider's quota is not exceeded.
struct RateLimiter {
    last_request: Option<Instant>,
    min_interval: Duration,
}

impl RateLimiter {
    const fn new(min_interval: Duration) -> Self {
        Self {
            last_request: None,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

/// EODHD API client.
///
/// Every request is fingerprinted by [`EodhdClient::cache_key`] and looked up
/// in the cache before any network call. Successful responses are written back
/// with the configured TTL.
pub struct EodhdClient {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    base_url: String,
    api_token: String,
    cache: Option<Arc<dyn ResponseCache>>,
    cache_ttl: Duration,
}

impl fmt::Debug for EodhdClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EodhdClient")
            .field("base_url", &self.base_url)
            .field("cached", &self.cache.is_some())
            .field("cache_ttl", &self.cache_ttl)
            .finish_non_exhaustive()
    }
}

impl EodhdClient {
    /// Create a client without a cache.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(DataError::Network)?;

        Ok(Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(Duration::from_millis(
                config.rate_limit_ms,
            )))),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            cache: None,
            cache_ttl: Duration::from_secs(config.cache_ttl_hours * 60 * 60),
        })
    }

    /// Attach a response cache.
    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Canonical fingerprint of a request: the endpoint followed by its query
    /// parameters sorted by name. The API token is never part of the key.
    pub fn cache_key(endpoint: &str, params: &[(&str, String)]) -> String {
        let mut sorted: Vec<&(&str, String)> = params.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0).then_with(|| a.1.cmp(&b.1)));

        let query = sorted
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        if query.is_empty() {
            endpoint.to_string()
        } else {
            format!("{endpoint}?{query}")
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        mut params: Vec<(&str, String)>,
    ) -> Result<T> {
        params.push(("fmt", "json".to_string()));
        let key = Self::cache_key(endpoint, &params);

        if let Some(cache) = &self.cache
            && let Some(body) = cache.get(&key)?
        {
            match serde_json::from_str(&body) {
                Ok(value) => {
                    debug!(key = %key, "cache hit");
                    return Ok(value);
                }
                Err(e) => warn!(key = %key, error = %e, "discarding undecodable cache entry"),
            }
        }
        debug!(key = %key, "cache miss");

        let url = format!("{}/{}", self.base_url, endpoint);
        let mut query = params.clone();
        query.push(("api_token", self.api_token.clone()));

        self.rate_limiter.lock().await.wait().await;

        let response = self.client.get(&url).query(&query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DataError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let value = serde_json::from_str(&body)?;

        if let Some(cache) = &self.cache
            && let Err(e) = cache.set(&key, &body, self.cache_ttl)
        {
            warn!(key = %key, error = %e, "failed to cache response");
        }

        Ok(value)
    }

    /// Fetch end-of-day bars, optionally bounded by inclusive dates.
    pub async fn fetch_eod(
        &self,
        ticker: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<EodBar>> {
        validate_ticker(ticker)?;
        let params = date_range(from, to);
        self.get(&format!("eod/{ticker}"), params).await
    }

    /// Fetch the full fundamentals document.
    pub async fn fetch_fundamentals(&self, ticker: &str) -> Result<Fundamentals> {
        validate_ticker(ticker)?;
        let raw: serde_json::Value = self
            .get(&format!("fundamentals/{ticker}"), Vec::new())
            .await?;

        if !raw.is_object() {
            return Err(DataError::MissingData {
                symbol: ticker.to_string(),
                reason: "fundamentals response is not an object".to_string(),
            });
        }
        Ok(Fundamentals::new(raw))
    }

    /// Fetch dividend payments, optionally bounded by inclusive dates.
    pub async fn fetch_dividends(
        &self,
        ticker: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Dividend>> {
        validate_ticker(ticker)?;
        let params = date_range(from, to);
        self.get(&format!("div/{ticker}"), params).await
    }

    /// Look up tickers by name or code.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Err(DataError::InvalidSymbol("Empty search query".to_string()));
        }
        let params = vec![("limit", limit.to_string())];
        self.get(&format!("search/{}", query.trim()), params).await
    }
}

fn validate_ticker(ticker: &str) -> Result<()> {
    if ticker.is_empty() || ticker.contains(['/', '?', '&', '#']) {
        return Err(DataError::InvalidSymbol(ticker.to_string()));
    }
    Ok(())
}

fn date_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(from) = from {
        params.push(("from", from.to_string()));
    }
    if let Some(to) = to {
        params.push(("to", to.to_string()));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_sorts_parameters() {
        let a = EodhdClient::cache_key(
            "eod/AAPL",
            &[("to", "2024-01-31".into()), ("from", "2024-01-01".into())],
        );
        let b = EodhdClient::cache_key(
            "eod/AAPL",
            &[("from", "2024-01-01".into()), ("to", "2024-01-31".into())],
        );

        assert_eq!(a, b);
        assert_eq!(a, "eod/AAPL?from=2024-01-01&to=2024-01-31");
    }

    #[test]
    fn test_cache_key_without_parameters() {
        assert_eq!(
            EodhdClient::cache_key("fundamentals/KO", &[]),
            "fundamentals/KO"
        );
    }

    #[test]
    fn test_cache_key_distinguishes_parameterizations() {
        let a = EodhdClient::cache_key("div/KO", &[("from", "2014-01-01".into())]);
        let b = EodhdClient::cache_key("div/KO", &[("from", "2015-01-01".into())]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_ticker_rejected() {
        assert!(matches!(validate_ticker(""), Err(DataError::InvalidSymbol(_))));
        assert!(matches!(
            validate_ticker("AAPL/../x"),
            Err(DataError::InvalidSymbol(_))
        ));
        assert!(validate_ticker("BRK-B.US").is_ok());
    }

    #[test]
    fn test_debug_hides_token() {
        let config = ProviderConfig {
            api_token: "secret-token".to_string(),
            ..ProviderConfig::default()
        };
        let client = EodhdClient::new(&config).unwrap();
        assert!(!format!("{client:?}").contains("secret-token"));
    }
}
