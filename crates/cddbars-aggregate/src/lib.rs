//! Merging and fixed-window aggregation for cddbars.
//!
//! This crate provides the computational half of the pipeline:
//!
//! - [`merge_dedup`] - Ascending, duplicate-free merge of multi-file loads
//! - [`aggregate`] - Positional `N`-minute bucketing
//! - [`BarAggregator`] - Streaming form of the same bucketing

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/cddbars/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod aggregator;
mod merge;

pub use aggregator::{BarAggregator, aggregate};
pub use merge::{MergeStats, dedup_by_time, merge_dedup, merge_dedup_with_stats, retain_finite};
