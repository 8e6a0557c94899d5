//! Fundamental valuation metrics.
//!
//! The intrinsic value model is Graham's revised formula:
//!
//! ```text
//! V = EPS × (8.5 + 2g) × 4.4 / Y
//! ```
//!
//! where `g` is the expected growth rate in percent and `Y` the current
//! benchmark bond yield in percent. The constants are fixed.

use crate::error::{Result, ValuationError};

/// No-growth price/earnings multiple.
pub const BASELINE_MULTIPLE: f64 = 8.5;

/// Multiplier applied to the growth percentage.
pub const GROWTH_MULTIPLIER: f64 = 2.0;

/// Historical bond yield the model was calibrated against, in percent.
pub const REFERENCE_YIELD: f64 = 4.4;

/// Net income divided by shareholders' equity.
///
/// # Errors
/// [`ValuationError::DivisionByZero`] when equity is exactly zero.
pub fn return_on_equity(net_income: f64, shareholders_equity: f64) -> Result<f64> {
    if shareholders_equity == 0.0 {
        return Err(ValuationError::DivisionByZero("shareholders' equity"));
    }
    Ok(net_income / shareholders_equity)
}

/// Intrinsic value per share.
///
/// `growth_percent` is a percentage (5.0 for 5 %). A non-positive
/// `current_yield` falls back to [`REFERENCE_YIELD`].
///
/// # Errors
/// [`ValuationError::InvalidInput`] when `eps <= 0` or `growth_percent < 0`.
pub fn intrinsic_value(eps: f64, growth_percent: f64, current_yield: f64) -> Result<f64> {
    if eps <= 0.0 {
        return Err(ValuationError::InvalidInput(format!(
            "EPS must be positive, got {eps}"
        )));
    }
    if growth_percent < 0.0 {
        return Err(ValuationError::InvalidInput(format!(
            "growth rate must be non-negative, got {growth_percent}"
        )));
    }

    let current_yield = if current_yield > 0.0 {
        current_yield
    } else {
        REFERENCE_YIELD
    };

    Ok(eps * (BASELINE_MULTIPLE + GROWTH_MULTIPLIER * growth_percent) * REFERENCE_YIELD
        / current_yield)
}

/// Fraction by which `price` sits below `intrinsic`. Zero when `intrinsic` is zero.
pub fn margin_of_safety(intrinsic: f64, price: f64) -> f64 {
    if intrinsic == 0.0 {
        return 0.0;
    }
    (intrinsic - price) / intrinsic
}

/// Trailing dividends per share over price. Zero when price is zero.
pub fn dividend_yield(annual_dividends: f64, price: f64) -> f64 {
    if price == 0.0 {
        return 0.0;
    }
    annual_dividends / price
}
