//! Technical indicators over dated closing prices.

use crate::error::{Result, ValuationError};
use chrono::NaiveDate;

/// One closing price on one trading date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Trading date
    pub date: NaiveDate,
    /// Closing price
    pub close: f64,
}

impl Observation {
    /// Create an observation.
    pub const fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Mean of the `window` most recent closes.
///
/// Observations are ordered by date descending before the first `window` are
/// averaged, so input order does not matter. Missing trading days are not
/// filled in.
///
/// # Errors
/// [`ValuationError::InsufficientData`] when fewer than `window` observations
/// are supplied, and [`ValuationError::InvalidInput`] for a zero window.
pub fn simple_moving_average(series: &[Observation], window: usize) -> Result<f64> {
    if window == 0 {
        return Err(ValuationError::InvalidInput(
            "moving average window must be positive".to_string(),
        ));
    }
    if series.len() < window {
        return Err(ValuationError::InsufficientData {
            required: window,
            available: series.len(),
        });
    }

    let mut recent: Vec<&Observation> = series.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));

    let sum: f64 = recent.iter().take(window).map(|o| o.close).sum();
    Ok(sum / window as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn series(closes: &[f64]) -> Vec<Observation> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Observation::new(start + chrono::Days::new(i as u64), c))
            .collect()
    }

    #[test]
    fn test_fewer_points_than_window_fails() {
        let err = simple_moving_average(&series(&[1.0, 2.0]), 3).unwrap_err();
        assert_eq!(
            err,
            ValuationError::InsufficientData {
                required: 3,
                available: 2
            }
        );
    }

    #[test]
    fn test_exact_window_is_arithmetic_mean() {
        let sma = simple_moving_average(&series(&[10.0, 20.0, 30.0, 40.0]), 4).unwrap();
        assert_relative_eq!(sma, 25.0);
    }

    #[test]
    fn test_uses_most_recent_points() {
        // Oldest first: the window of 2 covers the last two dates.
        let sma = simple_moving_average(&series(&[100.0, 1.0, 3.0]), 2).unwrap();
        assert_relative_eq!(sma, 2.0);
    }

    #[test]
    fn test_input_order_is_irrelevant() {
        let ordered = series(&[5.0, 6.0, 7.0, 8.0, 9.0]);
        let mut shuffled = ordered.clone();
        shuffled.swap(0, 4);
        shuffled.swap(1, 3);

        assert_relative_eq!(
            simple_moving_average(&ordered, 3).unwrap(),
            simple_moving_average(&shuffled, 3).unwrap()
        );
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(matches!(
            simple_moving_average(&series(&[1.0]), 0),
            Err(ValuationError::InvalidInput(_))
        ));
    }
}
