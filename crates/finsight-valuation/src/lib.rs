#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/finsight/finsight/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod fundamental;
pub mod growth;
pub mod technical;

pub use error::{Result, ValuationError};
pub use fundamental::{
    BASELINE_MULTIPLE, GROWTH_MULTIPLIER, REFERENCE_YIELD, dividend_yield, intrinsic_value,
    margin_of_safety, return_on_equity,
};
pub use growth::cagr;
pub use technical::{Observation, simple_moving_average};
