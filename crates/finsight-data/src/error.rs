//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur during data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// Network error, including request timeouts
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("HTTP error {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Database error in the response cache
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Missing data
    #[error("Missing data for {symbol}: {reason}")]
    MissingData {
        /// Symbol that was queried
        symbol: String,
        /// Reason for missing data
        reason: String,
    },

    /// Invalid symbol
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Cache error
    #[error("Cache error: {0}")]
    Cache(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(error: &DataError) -> &'static str {
        match error {
            DataError::Network(_) => "network",
            DataError::Http { .. } => "http",
            DataError::Database(_) => "database",
            DataError::Serialization(_) => "serialization",
            DataError::MissingData { .. } => "missing",
            DataError::InvalidSymbol(_) => "symbol",
            DataError::Cache(_) => "cache",
        }
    }

    #[test]
    fn test_conversions() {
        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(kind(&DataError::from(json)), "serialization");

        let sqlite = rusqlite::Error::QueryReturnedNoRows;
        assert_eq!(kind(&DataError::from(sqlite)), "database");
    }

    #[test]
    fn test_display() {
        let err = DataError::Http {
            status: 429,
            message: "Too Many Requests".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error 429: Too Many Requests");
        assert_eq!(kind(&err), "http");
    }
}
