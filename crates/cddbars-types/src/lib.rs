//! Core types for the cddbars minute-bar pipeline.
//!
//! This crate provides the fundamental data structures used throughout cddbars:
//!
//! - [`MinuteBar`] - An immutable OHLCV bar stamped with its close time
//! - [`Window`] - Aggregation window as a whole number of minutes
//! - [`CddError`] - Errors surfaced by every pipeline stage

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/cddbars/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bar;
mod error;
mod window;

pub use bar::MinuteBar;
pub use error::{CddError, Result};
pub use window::Window;
