//! Minute-bar ingestion and fixed-window aggregation for CryptoDataDownload CSVs.
//!
//! This is a facade crate that re-exports functionality from the cddbars
//! workspace crates and adds the end-to-end [`SeriesLoader`].
//!
//! # Quick Start
//!
//! ```ignore
//! use cddbars_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let loader = SeriesLoader::with_defaults()?;
//!     let window = Window::from_minutes(4)?;
//!
//!     let series = loader.fetch_series("Binance", "BTCUSDT", "minute", window).await?;
//!     println!("{}: {} bars, last close {:?}", series.name, series.len(), series.last_close());
//!
//!     let local = loader.load_resources(
//!         BundledResources::global(),
//!         "sample/BinanceBTCData",
//!         "Binance",
//!         "BTCUSDT",
//!         window,
//!     )?;
//!     println!("{}: {} bars", local.name, local.len());
//!
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/cddbars/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod loader;
mod series;

pub use loader::{LOCAL_INTERVAL, SeriesLoader};
pub use series::{BarSeries, FinitePolicy, LoadOptions};

// Re-export core types
pub use cddbars_types::*;

// Re-export source resolution
pub use cddbars_fetch::{
    BundledResources, CddConfig, CddSource, ClientConfig, DirResources, FetchClient, FetchError,
    FilePattern, ResourceSource, parse_minute_bars, read_folder, read_path, read_resource_dir,
};
pub use cddbars_fetch::url::{BASE_URL, DEFAULT_EXCHANGE};

// Re-export merging and aggregation
pub use cddbars_aggregate::{
    BarAggregator, MergeStats, aggregate, dedup_by_time, merge_dedup, merge_dedup_with_stats,
    retain_finite,
};

// Re-export formatters
#[cfg(feature = "format")]
pub use cddbars_format::{CsvFormatter, FormatError, Formatter, JsonFormatter, OutputFormat};

#[cfg(feature = "parquet")]
pub use cddbars_format::ParquetFormatter;

/// Prelude module for convenient imports.
///
/// ```
/// use cddbars_lib::prelude::*;
/// ```
pub mod prelude {
    pub use cddbars_types::{CddError, MinuteBar, Result, Window};

    pub use cddbars_fetch::{BundledResources, CddConfig, CddSource, ClientConfig, FetchClient};

    pub use crate::{BarSeries, FinitePolicy, LoadOptions, SeriesLoader};

    #[cfg(feature = "format")]
    pub use cddbars_format::{CsvFormatter, Formatter, JsonFormatter, OutputFormat};

    #[cfg(feature = "parquet")]
    pub use cddbars_format::ParquetFormatter;
}
