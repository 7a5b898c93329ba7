//! Named bar series and load options.

use cddbars_types::{MinuteBar, Window};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Aggregated bars with the label they are published under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    /// Display label, e.g. `BTCUSDT-4m-cdd`.
    pub name: String,
    /// Window the bars were aggregated to.
    pub window: Window,
    /// Bars in ascending time order.
    pub bars: Vec<MinuteBar>,
}

impl BarSeries {
    /// Creates a new series.
    #[must_use]
    pub fn new(name: impl Into<String>, window: Window, bars: Vec<MinuteBar>) -> Self {
        Self {
            name: name.into(),
            window,
            bars,
        }
    }

    /// Returns the number of bars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Returns true if the series has no bars.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Returns the most recent bar.
    #[must_use]
    pub fn last_bar(&self) -> Option<&MinuteBar> {
        self.bars.last()
    }

    /// Returns the close of the most recent bar.
    #[must_use]
    pub fn last_close(&self) -> Option<f64> {
        self.last_bar().map(|b| b.close)
    }

    /// Returns the time of the most recent bar.
    #[must_use]
    pub fn last_time(&self) -> Option<DateTime<Utc>> {
        self.last_bar().map(|b| b.time)
    }
}

/// Which loads drop bars with a non-finite open, high, low or close.
///
/// Unparseable price fields are read as NaN. Multi-file loads always
/// deduplicate; this policy decides whether the NaN rows go with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FinitePolicy {
    /// Filter folder and resource loads only. Single-file loads keep NaN rows.
    #[default]
    MultiFileOnly,
    /// Filter every load.
    Always,
    /// Never filter.
    Never,
}

impl FinitePolicy {
    /// Returns true if loads of the given shape should be filtered.
    #[must_use]
    pub const fn filters(self, multi_file: bool) -> bool {
        match self {
            Self::MultiFileOnly => multi_file,
            Self::Always => true,
            Self::Never => false,
        }
    }
}

impl std::str::FromStr for FinitePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "multi-file-only" | "multi-file" | "multi" => Ok(Self::MultiFileOnly),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            _ => Err(format!("unknown finite policy: {s}")),
        }
    }
}

/// Options applied by [`SeriesLoader`](crate::SeriesLoader).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Non-finite price filtering.
    pub finite: FinitePolicy,
}

impl LoadOptions {
    /// Sets the finite-price policy.
    #[must_use]
    pub const fn with_finite(mut self, finite: FinitePolicy) -> Self {
        self.finite = finite;
        self
    }
}
