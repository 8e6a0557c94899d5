//! Error types for filter translation and screening.

use thiserror::Error;

/// Result type for screener operations.
pub type Result<T> = std::result::Result<T, ScreenerError>;

/// Errors raised while parsing filters, building queries or reading the store.
#[derive(Debug, Error)]
pub enum ScreenerError {
    /// Filter JSON that is not an array of `[field, operator, value]` triples
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Operator outside the supported set
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    /// Value whose shape does not fit the operator
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Field the condition applies to
        field: String,
        /// What was wrong with the value
        reason: String,
    },

    /// Field that maps to neither table
    #[error("Unmapped field: {0}")]
    UnmappedField(String),

    /// Computed field used with an unsupported operator/value pair
    #[error("Unsupported use of computed field {field}: {operator} {value}")]
    InvalidComputedField {
        /// Computed field name
        field: String,
        /// Operator supplied
        operator: String,
        /// Value supplied, rendered as text
        value: String,
    },

    /// Page number below one
    #[error("Page must be a positive integer, got {0}")]
    InvalidPage(u32),

    /// Limit outside `1..=max`
    #[error("Limit must be between 1 and {max}, got {limit}")]
    InvalidLimit {
        /// Requested limit
        limit: u32,
        /// Configured maximum
        max: u32,
    },

    /// Store failure
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON encoding failure for stored blobs
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Connection lock poisoned by a panicking writer
    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl ScreenerError {
    /// Whether the error was caused by the caller's request rather than by the
    /// store.
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidFilter(_)
                | Self::UnknownOperator(_)
                | Self::InvalidValue { .. }
                | Self::UnmappedField(_)
                | Self::InvalidComputedField { .. }
                | Self::InvalidPage(_)
                | Self::InvalidLimit { .. }
        )
    }
}
