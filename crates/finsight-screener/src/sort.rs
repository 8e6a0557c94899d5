//! Sort key whitelist.
//!
//! ORDER BY cannot be parameterized, so only the keys listed here ever reach
//! the generated SQL.

/// Sort key used when none is given or the given one is not whitelisted.
pub const DEFAULT_SORT: &str = "pe_ratio.asc";

const WHITELIST: &[(&str, &str)] = &[
    ("pe_ratio.asc", "f.pe_ratio ASC"),
    ("pe_ratio.desc", "f.pe_ratio DESC"),
    ("roe.asc", "f.roe ASC"),
    ("roe.desc", "f.roe DESC"),
    ("close.asc", "p.close ASC"),
    ("close.desc", "p.close DESC"),
    ("dividend_yield.asc", "f.dividend_yield ASC"),
    ("dividend_yield.desc", "f.dividend_yield DESC"),
    ("margin_of_safety.asc", "f.margin_of_safety ASC"),
    ("margin_of_safety.desc", "f.margin_of_safety DESC"),
    ("ticker.asc", "f.ticker ASC"),
    ("ticker.desc", "f.ticker DESC"),
];

/// Whether `key` is one of the accepted sort keys.
pub fn is_whitelisted(key: &str) -> bool {
    WHITELIST.iter().any(|&(k, _)| k == key)
}

/// ORDER BY expression for `key`, falling back to `f.pe_ratio ASC`.
pub fn resolve(key: &str) -> &'static str {
    WHITELIST
        .iter()
        .find(|&&(k, _)| k == key)
        .map_or("f.pe_ratio ASC", |&(_, clause)| clause)
}

/// Every accepted sort key.
pub fn keys() -> impl Iterator<Item = &'static str> {
    WHITELIST.iter().map(|&(k, _)| k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("pe_ratio.asc", "f.pe_ratio ASC")]
    #[case("pe_ratio.desc", "f.pe_ratio DESC")]
    #[case("roe.desc", "f.roe DESC")]
    #[case("close.asc", "p.close ASC")]
    #[case("dividend_yield.desc", "f.dividend_yield DESC")]
    #[case("margin_of_safety.asc", "f.margin_of_safety ASC")]
    #[case("ticker.desc", "f.ticker DESC")]
    fn test_whitelisted(#[case] key: &str, #[case] clause: &str) {
        assert!(is_whitelisted(key));
        assert_eq!(resolve(key), clause);
    }

    #[rstest]
    #[case("")]
    #[case("pe_ratio ASC")]
    #[case("PE_RATIO.ASC")]
    #[case("sma50.asc")]
    #[case("pe_ratio.asc; DROP TABLE prices")]
    fn test_fallback(#[case] key: &str) {
        assert!(!is_whitelisted(key));
        assert_eq!(resolve(key), "f.pe_ratio ASC");
    }

    #[test]
    fn test_keys_cover_both_directions() {
        assert_eq!(keys().count(), 12);
        assert!(keys().all(|k| k.ends_with(".asc") || k.ends_with(".desc")));
    }
}
