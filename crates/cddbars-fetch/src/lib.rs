//! CSV source resolution and row parsing for cddbars.
//!
//! This crate turns a source description into parsed minute bars:
//!
//! - [`url::CddConfig::candidate_urls`] - Primary and legacy CryptoDataDownload URLs
//! - [`FetchClient`] - Single-attempt HTTP GET requiring status 200
//! - [`parse_minute_bars`] - Schema-tolerant CSV row parsing
//! - [`FilePattern`] - File name predicate for multi-file loads
//! - [`ResourceSource`] - Bundled or directory-backed resource trees
//! - [`CddSource`], [`read_path`], [`read_folder`], [`read_resource_dir`] - Loaders

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/cddbars/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod parse;
mod pattern;
mod resolve;
pub mod resources;
pub mod url;

pub use client::{ClientConfig, FetchClient, FetchError};
pub use parse::{parse_minute_bars, parse_time};
pub use pattern::FilePattern;
pub use resolve::{CddSource, read_folder, read_path, read_resource_dir, try_in_order};
pub use resources::{BundledResources, DirResources, ResourceSource};
pub use url::CddConfig;
