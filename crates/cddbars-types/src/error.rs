//! Error types for cddbars.

use thiserror::Error;

/// Result type alias for cddbars operations.
pub type Result<T> = std::result::Result<T, CddError>;

/// Errors that can occur while loading and aggregating bars.
#[derive(Error, Debug)]
pub enum CddError {
    /// No candidate produced data: non-200 status, transport failure,
    /// or a missing local path or resource.
    #[error("Source unavailable: {source_name}: {reason}")]
    SourceUnavailable {
        /// URL, path or resource that was attempted last.
        source_name: String,
        /// What went wrong.
        reason: String,
    },

    /// The CSV header lacks a resolvable time, OHLC or volume column.
    #[error("CSV missing required columns. Got: {header}")]
    Schema {
        /// The offending header line.
        header: String,
    },

    /// A directory or resource scan found nothing matching the naming pattern.
    #[error("No CSVs matching pattern {pattern} under {location}")]
    NoMatchingFiles {
        /// Human-readable form of the expected file name pattern.
        pattern: String,
        /// Directory or resource path that was scanned.
        location: String,
    },

    /// The requested window is not a positive whole number of minutes.
    #[error("Invalid aggregation window: {0}")]
    InvalidAggregationWindow(String),

    /// A data row could not be interpreted.
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Output format error.
    #[error("Format error: {0}")]
    Format(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CddError {
    /// Builds a [`CddError::SourceUnavailable`].
    pub fn unavailable(source_name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true for errors that name a source that could not be read.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }
}
