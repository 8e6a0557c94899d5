//! The screening read path.

use crate::error::{Result, ScreenerError};
use crate::filter::{FilterCondition, ScreenerFilter};
use crate::model::ScreenerResult;
use crate::query::build_query;
use crate::sort::DEFAULT_SORT;
use crate::store::Store;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

/// Pagination bounds for the screening read path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenerConfig {
    /// Page size when the caller gives none
    pub default_limit: u32,
    /// Largest page size accepted
    pub max_limit: u32,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            default_limit: 50,
            max_limit: 1000,
        }
    }
}

/// One page of screening results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenerPage {
    /// Results on this page
    pub data: Vec<ScreenerResult>,
    /// 1-based page number
    pub page: u32,
    /// Requested page size
    pub limit: u32,
    /// Number of results on this page
    pub total_count: usize,
    /// Whether another page follows
    pub has_more: bool,
}

/// Runs screening queries against the store.
///
/// Read-only and stateless apart from the shared store handle, so one engine
/// can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct ScreeningEngine {
    store: Arc<Store>,
    config: ScreenerConfig,
}

impl ScreeningEngine {
    /// Create an engine over `store`.
    pub const fn new(store: Arc<Store>, config: ScreenerConfig) -> Self {
        Self { store, config }
    }

    /// Pagination bounds in effect.
    pub const fn config(&self) -> &ScreenerConfig {
        &self.config
    }

    /// Run `filter` as given and return every matching row.
    pub fn screen(&self, filter: &ScreenerFilter) -> Result<Vec<ScreenerResult>> {
        let query = build_query(filter)?;
        let results = self.store.screen(&query).inspect_err(|e| {
            error!(error = %e, "screener query failed");
        })?;
        debug!(rows = results.len(), "screener query complete");
        Ok(results)
    }

    /// Fetch page `page` (1-based) of the results for `conditions`.
    ///
    /// `limit` defaults to the configured page size and must lie in
    /// `1..=max_limit`. An empty `sort` means `pe_ratio.asc`. One extra row is
    /// requested to decide `has_more`; `total_count` is the size of this page.
    pub fn screen_page(
        &self,
        page: u32,
        limit: Option<u32>,
        conditions: Vec<FilterCondition>,
        sort: &str,
    ) -> Result<ScreenerPage> {
        if page < 1 {
            return Err(ScreenerError::InvalidPage(page));
        }
        let limit = limit.unwrap_or(self.config.default_limit);
        if !(1..=self.config.max_limit).contains(&limit) {
            return Err(ScreenerError::InvalidLimit {
                limit,
                max: self.config.max_limit,
            });
        }

        let offset = (page - 1)
            .checked_mul(limit)
            .ok_or(ScreenerError::InvalidPage(page))?;
        let sort = if sort.is_empty() { DEFAULT_SORT } else { sort };

        let filter = ScreenerFilter::new(conditions)
            .with_sort(sort)
            .with_window(limit.saturating_add(1), offset);

        let mut data = self.screen(&filter)?;
        let has_more = data.len() > limit as usize;
        data.truncate(limit as usize);

        Ok(ScreenerPage {
            total_count: data.len(),
            data,
            page,
            limit,
            has_more,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ScreeningEngine {
        let store = Store::in_memory().unwrap();
        store.insert_sample_data().unwrap();
        ScreeningEngine::new(Arc::new(store), ScreenerConfig::default())
    }

    #[test]
    fn test_page_validation() {
        let engine = engine();
        assert!(matches!(
            engine.screen_page(0, None, vec![], ""),
            Err(ScreenerError::InvalidPage(0))
        ));
        assert!(matches!(
            engine.screen_page(1, Some(0), vec![], ""),
            Err(ScreenerError::InvalidLimit { limit: 0, .. })
        ));
        assert!(matches!(
            engine.screen_page(1, Some(1001), vec![], ""),
            Err(ScreenerError::InvalidLimit { limit: 1001, max: 1000 })
        ));
    }

    #[test]
    fn test_default_page_returns_whole_sample() {
        let page = engine().screen_page(1, None, vec![], "").unwrap();
        assert_eq!(page.limit, 50);
        assert_eq!(page.total_count, 15);
        assert!(!page.has_more);
        // pe_ratio ascending: PFE has the lowest P/E in the sample.
        assert_eq!(page.data[0].ticker, "PFE");
    }

    #[test]
    fn test_huge_page_number_does_not_overflow() {
        let result = engine().screen_page(u32::MAX, Some(1000), vec![], "");
        assert!(matches!(result, Err(ScreenerError::InvalidPage(_))));
    }

    #[test]
    fn test_envelope_serialization() {
        let page = engine().screen_page(1, Some(2), vec![], "ticker.asc").unwrap();
        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(json["page"], 1);
        assert_eq!(json["limit"], 2);
        assert_eq!(json["total_count"], 2);
        assert_eq!(json["has_more"], true);
        assert_eq!(json["data"][0]["ticker"], "AAPL");
    }
}
