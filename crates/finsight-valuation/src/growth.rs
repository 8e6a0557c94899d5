//! Growth rates.

/// Compound annual growth rate from `start` to `end` over `years`.
///
/// Returns `0.0` when either value is non-positive or `years <= 0`; callers
/// apply their own fallback in that case.
pub fn cagr(start: f64, end: f64, years: f64) -> f64 {
    if start <= 0.0 || end <= 0.0 || years <= 0.0 {
        return 0.0;
    }
    (end / start).powf(1.0 / years) - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_doubling_over_one_year() {
        assert_relative_eq!(cagr(50.0, 100.0, 1.0), 1.0);
    }

    #[test]
    fn test_five_year_growth() {
        // 1.1^5 = 1.61051
        assert_relative_eq!(cagr(1.0, 1.610_51, 5.0), 0.1, epsilon = 1e-9);
    }

    #[test]
    fn test_decline_is_negative() {
        assert!(cagr(2.0, 1.0, 5.0) < 0.0);
    }

    #[rstest]
    #[case(0.0, 3.0, 5.0)]
    #[case(-1.0, 3.0, 5.0)]
    #[case(2.0, 0.0, 5.0)]
    #[case(2.0, -4.0, 5.0)]
    #[case(2.0, 3.0, 0.0)]
    #[case(2.0, 3.0, -1.0)]
    fn test_guarded_inputs_yield_zero(#[case] start: f64, #[case] end: f64, #[case] years: f64) {
        assert_eq!(cagr(start, end, years), 0.0);
    }
}
