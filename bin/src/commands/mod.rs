//! CLI command implementations.

pub(crate) mod local;
pub(crate) mod remote;

/// Bundled directory holding the multi-month sample.
pub(crate) const DEFAULT_BUNDLED_DIR: &str = "sample/BinanceBTCData";
