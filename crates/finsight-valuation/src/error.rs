//! Error types for valuation computations.

use thiserror::Error;

/// Result type for valuation computations.
pub type Result<T> = std::result::Result<T, ValuationError>;

/// Failures of the pure valuation functions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValuationError {
    /// Fewer observations than the computation needs
    #[error("Insufficient data: need {required} observations, got {available}")]
    InsufficientData {
        /// Observations required
        required: usize,
        /// Observations supplied
        available: usize,
    },

    /// A denominator was exactly zero
    #[error("Division by zero: {0}")]
    DivisionByZero(&'static str),

    /// Inputs outside the domain of the model
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
