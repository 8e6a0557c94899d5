//! Extraction of metric inputs from provider payloads.

use chrono::{Datelike, NaiveDate};
use finsight_data::{Dividend, Fundamentals};
use serde_json::{Value, json};

const ANNUAL_EARNINGS: &str = "Earnings::Annual";
const BALANCE_SHEET: &str = "Financials::Balance_Sheet::yearly";
const INCOME_STATEMENT: &str = "Financials::Income_Statement::yearly";

/// Most recent annual EPS, with its period key.
pub(crate) fn latest_eps(fundamentals: &Fundamentals) -> Option<(String, f64)> {
    fundamentals
        .periods(ANNUAL_EARNINGS)
        .into_iter()
        .find_map(|period| {
            fundamentals
                .get_f64(&format!("{ANNUAL_EARNINGS}::{period}::epsActual"))
                .map(|eps| (period.to_string(), eps))
        })
}

/// Annual EPS reported `years` before `period`, matched by fiscal year.
pub(crate) fn eps_years_before(
    fundamentals: &Fundamentals,
    period: &str,
    years: u32,
) -> Option<f64> {
    let year = NaiveDate::parse_from_str(period, "%Y-%m-%d").ok()?.year();
    let target = format!("{}-", year - i32::try_from(years).ok()?);

    fundamentals
        .periods(ANNUAL_EARNINGS)
        .into_iter()
        .filter(|p| p.starts_with(&target))
        .find_map(|p| fundamentals.get_f64(&format!("{ANNUAL_EARNINGS}::{p}::epsActual")))
}

/// Inputs to return on equity from the most recent yearly balance sheet.
pub(crate) struct EquityInputs {
    pub(crate) period: String,
    pub(crate) equity: Option<f64>,
    pub(crate) net_income: Option<f64>,
}

/// Equity and net income for the latest balance sheet period, or `None` when
/// there is no yearly balance sheet at all.
pub(crate) fn equity_inputs(fundamentals: &Fundamentals) -> Option<EquityInputs> {
    let period = fundamentals.latest_period(BALANCE_SHEET)?.to_string();
    Some(EquityInputs {
        equity: fundamentals.get_f64(&format!("{BALANCE_SHEET}::{period}::totalStockholderEquity")),
        net_income: fundamentals.get_f64(&format!("{INCOME_STATEMENT}::{period}::netIncome")),
        period,
    })
}

/// `{period, current, previous, change}` for `item` across the two most
/// recent yearly income statements. `change` is relative to `|previous|` and
/// null when `previous` is zero.
pub(crate) fn year_over_year(fundamentals: &Fundamentals, item: &str) -> Option<Value> {
    let periods = fundamentals.periods(INCOME_STATEMENT);
    let [current_period, previous_period, ..] = periods.as_slice() else {
        return None;
    };

    let current = fundamentals.get_f64(&format!("{INCOME_STATEMENT}::{current_period}::{item}"))?;
    let previous = fundamentals.get_f64(&format!("{INCOME_STATEMENT}::{previous_period}::{item}"))?;
    let change = (previous != 0.0).then(|| (current - previous) / previous.abs());

    Some(json!({
        "period": current_period,
        "current": current,
        "previous": previous,
        "change": change,
    }))
}

/// Sum of dividends paid in calendar `year`.
pub(crate) fn dividends_in_year(dividends: &[Dividend], year: i32) -> f64 {
    dividends
        .iter()
        .filter(|d| d.date.year() == year)
        .map(|d| d.value)
        .sum()
}
