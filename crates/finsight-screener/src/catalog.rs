//! Field catalog: where every filterable field is stored.

use std::fmt;
use std::str::FromStr;

/// Table a stored field lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// One row per ticker
    Fundamentals,
    /// Most recent price row per ticker
    Prices,
}

impl Table {
    /// SQL alias used for the table in built queries.
    pub const fn alias(self) -> &'static str {
        match self {
            Self::Fundamentals => "f",
            Self::Prices => "p",
        }
    }
}

/// Fields stored on the fundamentals table.
pub const FUNDAMENTALS_FIELDS: &[&str] = &[
    "ticker",
    "pe_ratio",
    "roe",
    "earnings_outlook",
    "dividend_yield",
    "dividend_growth_5y",
    "intrinsic_value",
    "margin_of_safety",
];

/// Fields stored on the prices table.
pub const PRICES_FIELDS: &[&str] = &["close", "sma50", "sma200"];

/// Legacy external names and the columns they now refer to.
const ALIASES: &[(&str, &str)] = &[
    ("market_capitalization", "market_cap"),
    ("dividend_yield", "dividend_yield"),
    ("earnings_share", "eps"),
    ("sector", "sector"),
    ("industry", "industry"),
    ("exchange", "exchange"),
    ("refund_5d_p", "return_5d"),
    ("avgvol_200d", "avg_volume_200d"),
    ("type", "asset_type"),
];

/// Table holding `field`, or `None` when the field is not stored anywhere.
///
/// Computed fields are not stored and also return `None`; see
/// [`ComputedField`].
pub fn locate(field: &str) -> Option<Table> {
    if FUNDAMENTALS_FIELDS.contains(&field) {
        Some(Table::Fundamentals)
    } else if PRICES_FIELDS.contains(&field) {
        Some(Table::Prices)
    } else {
        None
    }
}

/// Map a legacy external field name to its internal name. Identity for
/// names without an alias.
pub fn rename(external: &str) -> &str {
    ALIASES
        .iter()
        .find(|&&(from, _)| from == external)
        .map_or(external, |&(_, to)| to)
}

/// Fields that compare two stored columns instead of binding a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComputedField {
    /// Close relative to the 50-day average
    PriceVsSma50,
    /// Close relative to the 200-day average
    PriceVsSma200,
    /// Intrinsic value relative to close
    IntrinsicVsPrice,
}

impl ComputedField {
    /// External field name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::PriceVsSma50 => "price_vs_sma50",
            Self::PriceVsSma200 => "price_vs_sma200",
            Self::IntrinsicVsPrice => "intrinsic_vs_price",
        }
    }

    /// Left and right hand columns of the comparison.
    pub const fn columns(self) -> (&'static str, &'static str) {
        match self {
            Self::PriceVsSma50 => ("p.close", "p.sma50"),
            Self::PriceVsSma200 => ("p.close", "p.sma200"),
            Self::IntrinsicVsPrice => ("f.intrinsic_value", "p.close"),
        }
    }
}

impl fmt::Display for ComputedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ComputedField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price_vs_sma50" => Ok(Self::PriceVsSma50),
            "price_vs_sma200" => Ok(Self::PriceVsSma200),
            "intrinsic_vs_price" => Ok(Self::IntrinsicVsPrice),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ticker", Some(Table::Fundamentals))]
    #[case("pe_ratio", Some(Table::Fundamentals))]
    #[case("margin_of_safety", Some(Table::Fundamentals))]
    #[case("close", Some(Table::Prices))]
    #[case("sma200", Some(Table::Prices))]
    #[case("market_cap", None)]
    #[case("price_vs_sma50", None)]
    #[case("", None)]
    fn test_locate(#[case] field: &str, #[case] expected: Option<Table>) {
        assert_eq!(locate(field), expected);
    }

    #[rstest]
    #[case("market_capitalization", "market_cap")]
    #[case("earnings_share", "eps")]
    #[case("refund_5d_p", "return_5d")]
    #[case("avgvol_200d", "avg_volume_200d")]
    #[case("type", "asset_type")]
    #[case("dividend_yield", "dividend_yield")]
    #[case("pe_ratio", "pe_ratio")]
    #[case("anything_else", "anything_else")]
    fn test_rename(#[case] external: &str, #[case] internal: &str) {
        assert_eq!(rename(external), internal);
    }

    #[test]
    fn test_computed_fields_are_not_stored() {
        for field in [
            ComputedField::PriceVsSma50,
            ComputedField::PriceVsSma200,
            ComputedField::IntrinsicVsPrice,
        ] {
            assert_eq!(field.name().parse::<ComputedField>(), Ok(field));
            assert_eq!(locate(field.name()), None);
        }
    }
}
