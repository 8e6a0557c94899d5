//! When the nightly refresh runs.

use chrono::{Datelike, NaiveDate, Weekday};

/// Weekday gate for the nightly refresh.
///
/// Markets are closed on the idle days, so there is no new end-of-day data to
/// fetch and the refresh stays idle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSchedule {
    idle_days: Vec<Weekday>,
}

impl RefreshSchedule {
    /// A schedule idle on the given weekdays.
    pub fn new(idle_days: impl Into<Vec<Weekday>>) -> Self {
        Self {
            idle_days: idle_days.into(),
        }
    }

    /// A schedule that refreshes every day.
    pub const fn always() -> Self {
        Self {
            idle_days: Vec::new(),
        }
    }

    /// Whether a refresh should run on `date`.
    pub fn should_refresh(&self, date: NaiveDate) -> bool {
        !self.idle_days.contains(&date.weekday())
    }
}

impl Default for RefreshSchedule {
    fn default() -> Self {
        Self::new([Weekday::Sat, Weekday::Sun])
    }
}
