//! Raw fundamentals document with `::`-path lookups.

use serde_json::Value;

/// Separator between segments of a fundamentals path.
pub const PATH_SEPARATOR: &str = "::";

/// The fundamentals payload for one ticker, kept as untyped JSON.
///
/// EODHD nests statements by section and period, for example
/// `Financials::Balance_Sheet::yearly::2023-12-31::totalStockholderEquity`.
/// Numeric leaves arrive either as JSON numbers or as decimal strings.
#[derive(Debug, Clone, PartialEq)]
pub struct Fundamentals {
    raw: Value,
}

impl Fundamentals {
    /// Wrap a decoded fundamentals document.
    pub const fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// The underlying JSON document.
    pub const fn raw(&self) -> &Value {
        &self.raw
    }

    /// Resolve a `::`-separated path to a JSON node.
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split(PATH_SEPARATOR)
            .try_fold(&self.raw, |node, key| node.as_object()?.get(key))
    }

    /// Resolve a path to a number.
    ///
    /// Returns `None` when any segment is missing, the leaf is null, or the
    /// leaf is a string that does not parse as a float.
    pub fn get_f64(&self, path: &str) -> Option<f64> {
        match self.get(path)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Period keys stored under `path`, most recent first.
    ///
    /// Keys are ISO dates, so lexicographic order is chronological order.
    pub fn periods(&self, path: &str) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .get(path)
            .and_then(Value::as_object)
            .map(|map| map.keys().map(String::as_str).collect())
            .unwrap_or_default();
        keys.sort_unstable_by(|a, b| b.cmp(a));
        keys
    }

    /// The lexicographically greatest (most recent) period key under `path`.
    pub fn latest_period(&self, path: &str) -> Option<&str> {
        self.get(path)?
            .as_object()?
            .keys()
            .map(String::as_str)
            .max()
    }
}

impl From<Value> for Fundamentals {
    fn from(raw: Value) -> Self {
        Self::new(raw)
    }
}
