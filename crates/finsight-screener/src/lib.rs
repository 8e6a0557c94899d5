#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/finsight/finsight/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod catalog;
pub mod engine;
pub mod error;
pub mod filter;
pub mod model;
pub mod query;
pub mod sort;
pub mod store;

pub use catalog::{ComputedField, Table};
pub use engine::{ScreenerConfig, ScreenerPage, ScreeningEngine};
pub use error::{Result, ScreenerError};
pub use filter::{
    FilterBuilder, FilterCondition, FilterValue, Operator, Preset, ScreenerFilter, parse_filters,
};
pub use model::{FundamentalsRecord, PricePoint, ScreenerResult};
pub use query::{BuiltQuery, build_query};
pub use store::Store;
