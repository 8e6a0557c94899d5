//! Filter conditions, their JSON wire format, and ways to build them.
//!
//! The wire format is a JSON array of `[field, operator, value]` triples that
//! are conjoined with AND:
//!
//! ```
//! use finsight_screener::{FilterValue, Operator, parse_filters};
//!
//! let conditions = parse_filters(r#"[["pe_ratio","<",15],["roe",">",0.15]]"#).unwrap();
//! assert_eq!(conditions.len(), 2);
//! assert_eq!(conditions[0].operator, Operator::Lt);
//! assert_eq!(conditions[1].value, FilterValue::Number(0.15));
//! ```

use crate::catalog::{self, ComputedField};
use crate::error::{Result, ScreenerError};
use crate::sort::DEFAULT_SORT;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Right hand side of a condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Numeric comparison value
    Number(f64),
    /// Text comparison or LIKE pattern
    Text(String),
    /// Members for IN
    TextList(Vec<String>),
}

impl FilterValue {
    /// Whether the value is exactly the number `1.0`.
    pub fn is_unit(&self) -> bool {
        matches!(self, Self::Number(n) if *n == 1.0)
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "'{s}'"),
            Self::TextList(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(items: Vec<String>) -> Self {
        Self::TextList(items)
    }
}

impl TryFrom<Value> for FilterValue {
    type Error = String;

    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(Self::Number)
                .ok_or_else(|| format!("number {n} is out of range")),
            Value::String(s) => Ok(Self::Text(s)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(format!("list members must be strings, got {other}")),
                })
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(Self::TextList),
            other => Err(format!("expected number, string or list of strings, got {other}")),
        }
    }
}

/// Comparison operators accepted in a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Eq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `!=`
    Ne,
    /// `LIKE`
    Like,
    /// `IN`
    In,
}

impl Operator {
    /// SQL spelling of the operator.
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Ne => "!=",
            Self::Like => "LIKE",
            Self::In => "IN",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for Operator {
    type Err = ScreenerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "=" => Ok(Self::Eq),
            "<" => Ok(Self::Lt),
            ">" => Ok(Self::Gt),
            "<=" => Ok(Self::Le),
            ">=" => Ok(Self::Ge),
            "!=" => Ok(Self::Ne),
            "LIKE" => Ok(Self::Like),
            "IN" => Ok(Self::In),
            other => Err(ScreenerError::UnknownOperator(other.to_string())),
        }
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_sql())
    }
}

/// A single `(field, operator, value)` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    /// Internal field name
    pub field: String,
    /// Comparison operator
    pub operator: Operator,
    /// Comparison value
    pub value: FilterValue,
}

impl FilterCondition {
    /// Create a condition.
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<FilterValue>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }
}

impl Serialize for FilterCondition {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        (&self.field, self.operator, &self.value).serialize(serializer)
    }
}

/// Conditions plus sort key and pagination window.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenerFilter {
    /// Conditions, conjoined with AND
    pub conditions: Vec<FilterCondition>,
    /// External sort key such as `pe_ratio.asc`
    pub sort: String,
    /// Maximum rows returned; zero means unbounded
    pub limit: u32,
    /// Rows skipped before the first returned row
    pub offset: u32,
}

impl Default for ScreenerFilter {
    fn default() -> Self {
        Self {
            conditions: Vec::new(),
            sort: DEFAULT_SORT.to_string(),
            limit: 50,
            offset: 0,
        }
    }
}

impl ScreenerFilter {
    /// A filter with the given conditions and default sort and window.
    pub fn new(conditions: Vec<FilterCondition>) -> Self {
        Self {
            conditions,
            ..Self::default()
        }
    }

    /// Set the sort key.
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = sort.into();
        self
    }

    /// Set limit and offset.
    pub const fn with_window(mut self, limit: u32, offset: u32) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }
}

/// Parse the JSON wire format into conditions.
///
/// An empty (or all-whitespace) string yields no conditions. Field names pass
/// through [`catalog::rename`]. Whether the field exists is checked later, when
/// the query is built.
pub fn parse_filters(json: &str) -> Result<Vec<FilterCondition>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }

    let raw: Vec<Vec<Value>> = serde_json::from_str(json)
        .map_err(|e| ScreenerError::InvalidFilter(format!("invalid filter JSON: {e}")))?;

    raw.into_iter()
        .map(|triple| {
            let [field, operator, value]: [Value; 3] = triple.try_into().map_err(|_| {
                ScreenerError::InvalidFilter(
                    "invalid condition format: expected [field, operator, value]".to_string(),
                )
            })?;

            let Value::String(field) = field else {
                return Err(ScreenerError::InvalidFilter(
                    "field must be a string".to_string(),
                ));
            };
            let Value::String(operator) = operator else {
                return Err(ScreenerError::InvalidFilter(
                    "operator must be a string".to_string(),
                ));
            };

            let field = catalog::rename(&field).to_string();
            let operator = operator.parse::<Operator>()?;
            let value = FilterValue::try_from(value).map_err(|reason| {
                ScreenerError::InvalidValue {
                    field: field.clone(),
                    reason,
                }
            })?;

            Ok(FilterCondition {
                field,
                operator,
                value,
            })
        })
        .collect()
}

/// Fluent construction of condition lists.
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    conditions: Vec<FilterCondition>,
}

impl FilterBuilder {
    /// Start with no conditions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an arbitrary condition.
    pub fn condition(
        mut self,
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<FilterValue>,
    ) -> Self {
        self.conditions
            .push(FilterCondition::new(field, operator, value));
        self
    }

    /// `pe_ratio < value`
    pub fn pe_less_than(self, value: f64) -> Self {
        self.condition("pe_ratio", Operator::Lt, value)
    }

    /// `pe_ratio > value`
    pub fn pe_greater_than(self, value: f64) -> Self {
        self.condition("pe_ratio", Operator::Gt, value)
    }

    /// `min <= pe_ratio <= max`
    pub fn pe_between(self, min: f64, max: f64) -> Self {
        self.condition("pe_ratio", Operator::Ge, min)
            .condition("pe_ratio", Operator::Le, max)
    }

    /// `roe > value`
    pub fn roe_greater_than(self, value: f64) -> Self {
        self.condition("roe", Operator::Gt, value)
    }

    /// `roe < value`
    pub fn roe_less_than(self, value: f64) -> Self {
        self.condition("roe", Operator::Lt, value)
    }

    /// `min <= roe <= max`
    pub fn roe_between(self, min: f64, max: f64) -> Self {
        self.condition("roe", Operator::Ge, min)
            .condition("roe", Operator::Le, max)
    }

    /// Close below its 50-day average.
    pub fn price_below_sma50(self) -> Self {
        self.condition(ComputedField::PriceVsSma50.name(), Operator::Lt, 1.0)
    }

    /// Close above its 50-day average.
    pub fn price_above_sma50(self) -> Self {
        self.condition(ComputedField::PriceVsSma50.name(), Operator::Gt, 1.0)
    }

    /// Close below its 200-day average.
    pub fn price_below_sma200(self) -> Self {
        self.condition(ComputedField::PriceVsSma200.name(), Operator::Lt, 1.0)
    }

    /// Close above its 200-day average.
    pub fn price_above_sma200(self) -> Self {
        self.condition(ComputedField::PriceVsSma200.name(), Operator::Gt, 1.0)
    }

    /// `min <= close <= max`
    pub fn price_between(self, min: f64, max: f64) -> Self {
        self.condition("close", Operator::Ge, min)
            .condition("close", Operator::Le, max)
    }

    /// `dividend_yield > value`
    pub fn dividend_yield_greater_than(self, value: f64) -> Self {
        self.condition("dividend_yield", Operator::Gt, value)
    }

    /// `dividend_growth_5y > value`
    pub fn dividend_growth_greater_than(self, value: f64) -> Self {
        self.condition("dividend_growth_5y", Operator::Gt, value)
    }

    /// `margin_of_safety > value`
    pub fn margin_of_safety_greater_than(self, value: f64) -> Self {
        self.condition("margin_of_safety", Operator::Gt, value)
    }

    /// Intrinsic value above close.
    pub fn intrinsic_above_price(self) -> Self {
        self.condition(ComputedField::IntrinsicVsPrice.name(), Operator::Gt, 1.0)
    }

    /// `earnings_outlook = outlook`
    pub fn earnings_outlook(self, outlook: &str) -> Self {
        self.condition("earnings_outlook", Operator::Eq, outlook)
    }

    /// `ticker = ticker`
    pub fn ticker(self, ticker: &str) -> Self {
        self.condition("ticker", Operator::Eq, ticker)
    }

    /// `ticker IN (...)`
    pub fn ticker_in<I, S>(self, tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tickers: Vec<String> = tickers.into_iter().map(Into::into).collect();
        self.condition("ticker", Operator::In, tickers)
    }

    /// The conditions collected so far.
    pub fn conditions(&self) -> &[FilterCondition] {
        &self.conditions
    }

    /// A filter with the default sort and window.
    pub fn build(self) -> ScreenerFilter {
        ScreenerFilter::new(self.conditions)
    }

    /// A filter with an explicit sort and window.
    pub fn build_with_pagination(self, sort: &str, limit: u32, offset: u32) -> ScreenerFilter {
        ScreenerFilter::new(self.conditions)
            .with_sort(sort)
            .with_window(limit, offset)
    }

    /// Encode the conditions in the JSON wire format. Empty when there are no
    /// conditions.
    pub fn to_json(&self) -> Result<String> {
        if self.conditions.is_empty() {
            return Ok(String::new());
        }
        Ok(serde_json::to_string(&self.conditions)?)
    }
}

/// Named screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// Low P/E with strong ROE
    Value,
    /// Meaningful yield with growing payouts
    Dividend,
    /// Trading well below intrinsic value
    Undervalued,
    /// High ROE with a positive outlook
    Growth,
    /// Very low P/E under the 200-day average
    Bargain,
}

impl Preset {
    /// Every preset.
    pub const ALL: [Self; 5] = [
        Self::Value,
        Self::Dividend,
        Self::Undervalued,
        Self::Growth,
        Self::Bargain,
    ];

    /// Preset name as accepted on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Dividend => "dividend",
            Self::Undervalued => "undervalued",
            Self::Growth => "growth",
            Self::Bargain => "bargain",
        }
    }

    /// Builder holding the preset's conditions.
    pub fn builder(self) -> FilterBuilder {
        let builder = FilterBuilder::new();
        match self {
            Self::Value => builder.pe_less_than(15.0).roe_greater_than(0.15),
            Self::Dividend => builder
                .dividend_yield_greater_than(0.03)
                .dividend_growth_greater_than(0.05),
            Self::Undervalued => builder
                .margin_of_safety_greater_than(0.20)
                .intrinsic_above_price(),
            Self::Growth => builder.roe_greater_than(0.20).earnings_outlook("positive"),
            Self::Bargain => builder.pe_less_than(10.0).price_below_sma200(),
        }
    }

    /// The preset's conditions.
    pub fn conditions(self) -> Vec<FilterCondition> {
        self.builder().conditions
    }
}

impl FromStr for Preset {
    type Err = ScreenerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ScreenerError::InvalidFilter(format!("unknown preset: {s}")))
    }
}
