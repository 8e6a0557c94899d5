//! Translation of a [`ScreenerFilter`] into parameterized SQL.

use crate::catalog::{self, ComputedField};
use crate::error::{Result, ScreenerError};
use crate::filter::{FilterCondition, FilterValue, Operator, ScreenerFilter};
use crate::sort;
use rusqlite::types::Value;
use tracing::debug;

/// Result columns in the order [`crate::ScreenerResult`] reads them.
const SELECT: &str = "SELECT
    f.ticker,
    COALESCE(f.pe_ratio, 0) AS pe_ratio,
    COALESCE(f.roe, 0) AS roe,
    COALESCE(p.close, 0) AS close,
    COALESCE(p.sma50, 0) AS sma50,
    COALESCE(p.sma200, 0) AS sma200,
    COALESCE(f.earnings_outlook, '') AS earnings_outlook,
    COALESCE(f.dividend_yield, 0) AS dividend_yield,
    COALESCE(f.dividend_growth_5y, 0) AS dividend_growth_5y,
    COALESCE(f.intrinsic_value, 0) AS intrinsic_value,
    COALESCE(f.margin_of_safety, 0) AS margin_of_safety
FROM fundamentals f
LEFT JOIN (
    SELECT p1.ticker, p1.close, p1.sma50, p1.sma200
    FROM prices p1
    WHERE p1.date = (SELECT MAX(p2.date) FROM prices p2 WHERE p2.ticker = p1.ticker)
) p ON f.ticker = p.ticker";

/// SQL text with `?` placeholders and the values bound to them, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    /// Query text
    pub sql: String,
    /// Bound parameters
    pub params: Vec<Value>,
}

/// Build the query for `filter`.
///
/// Conditions are translated in order and joined with AND; no WHERE clause is
/// emitted when there are none. Limit and offset are emitted as literals and
/// are expected to have been validated by the caller.
///
/// # Errors
/// Any [`ScreenerError`] validation variant raised by a condition. The first
/// failing condition aborts the build.
pub fn build_query(filter: &ScreenerFilter) -> Result<BuiltQuery> {
    let mut predicates = Vec::with_capacity(filter.conditions.len());
    let mut params = Vec::new();

    for condition in &filter.conditions {
        let (predicate, bound) = translate(condition)?;
        predicates.push(predicate);
        params.extend(bound);
    }

    let mut sql = String::from(SELECT);

    if !predicates.is_empty() {
        sql.push_str("\nWHERE ");
        sql.push_str(&predicates.join(" AND "));
    }

    sql.push_str("\nORDER BY ");
    sql.push_str(sort::resolve(&filter.sort));
    sql.push_str(", f.ticker ASC");

    match (filter.limit, filter.offset) {
        (0, 0) => {}
        (0, offset) => sql.push_str(&format!("\nLIMIT -1 OFFSET {offset}")),
        (limit, 0) => sql.push_str(&format!("\nLIMIT {limit}")),
        (limit, offset) => sql.push_str(&format!("\nLIMIT {limit} OFFSET {offset}")),
    }

    debug!(sql = %sql, params = params.len(), "built screener query");
    Ok(BuiltQuery { sql, params })
}

/// Translate one condition into a predicate and its bound values.
pub fn translate(condition: &FilterCondition) -> Result<(String, Vec<Value>)> {
    if let Ok(computed) = condition.field.parse::<ComputedField>() {
        return translate_computed(computed, condition).map(|predicate| (predicate, Vec::new()));
    }

    let table = catalog::locate(&condition.field)
        .ok_or_else(|| ScreenerError::UnmappedField(condition.field.clone()))?;
    let column = format!("{}.{}", table.alias(), condition.field);

    match (condition.operator, &condition.value) {
        (Operator::In, FilterValue::TextList(items)) if !items.is_empty() => {
            let placeholders = vec!["?"; items.len()].join(", ");
            let params = items.iter().map(|item| Value::Text(item.clone())).collect();
            Ok((format!("{column} IN ({placeholders})"), params))
        }
        (Operator::In, FilterValue::TextList(_)) => Err(invalid_value(
            condition,
            "IN requires at least one value",
        )),
        (Operator::In, _) => Err(invalid_value(condition, "IN requires a list of strings")),
        (operator, FilterValue::TextList(_)) => Err(invalid_value(
            condition,
            &format!("{operator} does not accept a list"),
        )),
        (operator, FilterValue::Number(n)) => {
            Ok((format!("{column} {operator} ?"), vec![Value::Real(*n)]))
        }
        (operator, FilterValue::Text(s)) => {
            Ok((format!("{column} {operator} ?"), vec![Value::Text(s.clone())]))
        }
    }
}

fn translate_computed(field: ComputedField, condition: &FilterCondition) -> Result<String> {
    let allowed = match field {
        ComputedField::PriceVsSma50 | ComputedField::PriceVsSma200 => {
            matches!(condition.operator, Operator::Lt | Operator::Gt)
        }
        ComputedField::IntrinsicVsPrice => condition.operator == Operator::Gt,
    };

    if !allowed || !condition.value.is_unit() {
        return Err(ScreenerError::InvalidComputedField {
            field: field.name().to_string(),
            operator: condition.operator.to_string(),
            value: condition.value.to_string(),
        });
    }

    let (lhs, rhs) = field.columns();
    Ok(format!("{lhs} {} {rhs}", condition.operator))
}

fn invalid_value(condition: &FilterCondition, reason: &str) -> ScreenerError {
    ScreenerError::InvalidValue {
        field: condition.field.clone(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterBuilder, Preset};
    use rstest::rstest;

    fn where_clause(sql: &str) -> Option<&str> {
        let start = sql.find("\nWHERE ")? + "\nWHERE ".len();
        let end = sql.find("\nORDER BY ")?;
        Some(&sql[start..end])
    }

    #[test]
    fn test_no_conditions_no_where() {
        let query = build_query(&ScreenerFilter::default()).unwrap();
        assert!(!query.sql.contains("WHERE"));
        assert!(query.params.is_empty());
        assert!(query.sql.contains("MAX(p2.date)"));
    }

    #[test]
    fn test_standard_conditions_are_bound_in_order() {
        let filter = FilterBuilder::new()
            .pe_less_than(15.0)
            .roe_greater_than(0.15)
            .earnings_outlook("positive")
            .build();
        let query = build_query(&filter).unwrap();

        assert_eq!(
            where_clause(&query.sql),
            Some("f.pe_ratio < ? AND f.roe > ? AND f.earnings_outlook = ?")
        );
        assert_eq!(
            query.params,
            vec![
                Value::Real(15.0),
                Value::Real(0.15),
                Value::Text("positive".to_string())
            ]
        );
    }

    #[test]
    fn test_price_fields_use_price_alias() {
        let filter = FilterBuilder::new().price_between(10.0, 20.0).build();
        let query = build_query(&filter).unwrap();
        assert_eq!(where_clause(&query.sql), Some("p.close >= ? AND p.close <= ?"));
    }

    #[test]
    fn test_in_expands_placeholders() {
        let filter = FilterBuilder::new().ticker_in(["KO", "AAPL", "MSFT"]).build();
        let query = build_query(&filter).unwrap();

        assert_eq!(where_clause(&query.sql), Some("f.ticker IN (?, ?, ?)"));
        assert_eq!(
            query.params,
            vec![
                Value::Text("KO".into()),
                Value::Text("AAPL".into()),
                Value::Text("MSFT".into())
            ]
        );
    }

    #[rstest]
    #[case(ComputedField::PriceVsSma50, Operator::Lt, "p.close < p.sma50")]
    #[case(ComputedField::PriceVsSma50, Operator::Gt, "p.close > p.sma50")]
    #[case(ComputedField::PriceVsSma200, Operator::Lt, "p.close < p.sma200")]
    #[case(ComputedField::PriceVsSma200, Operator::Gt, "p.close > p.sma200")]
    #[case(ComputedField::IntrinsicVsPrice, Operator::Gt, "f.intrinsic_value > p.close")]
    fn test_computed_fields(
        #[case] field: ComputedField,
        #[case] operator: Operator,
        #[case] expected: &str,
    ) {
        let condition = FilterCondition::new(field.name(), operator, 1.0);
        assert_eq!(translate(&condition).unwrap(), (expected.to_string(), vec![]));
    }

    #[rstest]
    #[case(ComputedField::PriceVsSma50, Operator::Lt, FilterValue::Number(0.9))]
    #[case(ComputedField::PriceVsSma50, Operator::Eq, FilterValue::Number(1.0))]
    #[case(ComputedField::PriceVsSma200, Operator::Le, FilterValue::Number(1.0))]
    #[case(ComputedField::PriceVsSma200, Operator::Lt, FilterValue::Text("1.0".into()))]
    #[case(ComputedField::IntrinsicVsPrice, Operator::Lt, FilterValue::Number(1.0))]
    #[case(ComputedField::IntrinsicVsPrice, Operator::Gt, FilterValue::Number(0.0))]
    fn test_computed_field_misuse_is_deterministic(
        #[case] field: ComputedField,
        #[case] operator: Operator,
        #[case] value: FilterValue,
    ) {
        let condition = FilterCondition::new(field.name(), operator, value);
        let first = translate(&condition).unwrap_err().to_string();
        let second = translate(&condition).unwrap_err().to_string();

        assert!(first.contains(field.name()));
        assert_eq!(first, second);
    }

    #[test]
    fn test_unmapped_field_names_the_field() {
        let filter = ScreenerFilter::new(vec![
            FilterCondition::new("pe_ratio", Operator::Lt, 20.0),
            FilterCondition::new("market_cap", Operator::Gt, 1e9),
        ]);
        let err = build_query(&filter).unwrap_err();
        assert!(matches!(err, ScreenerError::UnmappedField(f) if f == "market_cap"));
    }

    #[test]
    fn test_in_value_shapes() {
        let empty = FilterCondition::new("ticker", Operator::In, Vec::<String>::new());
        let scalar = FilterCondition::new("ticker", Operator::In, "AAPL");
        let list_on_eq = FilterCondition::new("ticker", Operator::Eq, vec!["AAPL".to_string()]);

        for condition in [empty, scalar, list_on_eq] {
            assert!(matches!(
                translate(&condition),
                Err(ScreenerError::InvalidValue { .. })
            ));
        }
    }

    #[test]
    fn test_like_binds_pattern() {
        let condition = FilterCondition::new("ticker", Operator::Like, "A%");
        assert_eq!(
            translate(&condition).unwrap(),
            ("f.ticker LIKE ?".to_string(), vec![Value::Text("A%".into())])
        );
    }

    #[rstest]
    #[case("roe.desc", "ORDER BY f.roe DESC, f.ticker ASC")]
    #[case("close.asc", "ORDER BY p.close ASC, f.ticker ASC")]
    #[case("1; DROP TABLE fundamentals", "ORDER BY f.pe_ratio ASC, f.ticker ASC")]
    fn test_order_by(#[case] sort: &str, #[case] expected: &str) {
        let query = build_query(&ScreenerFilter::default().with_sort(sort)).unwrap();
        assert!(query.sql.contains(expected));
        assert!(!query.sql.contains("DROP"));
    }

    #[rstest]
    #[case(0, 0, None)]
    #[case(51, 0, Some("LIMIT 51"))]
    #[case(11, 20, Some("LIMIT 11 OFFSET 20"))]
    #[case(0, 5, Some("LIMIT -1 OFFSET 5"))]
    fn test_window(#[case] limit: u32, #[case] offset: u32, #[case] tail: Option<&str>) {
        let query = build_query(&ScreenerFilter::default().with_window(limit, offset)).unwrap();
        match tail {
            Some(tail) => assert!(query.sql.ends_with(tail)),
            None => assert!(!query.sql.contains("LIMIT")),
        }
    }

    #[test]
    fn test_every_preset_translates() {
        for preset in Preset::ALL {
            assert!(build_query(&preset.builder().build()).is_ok(), "{preset:?}");
        }
    }
}
