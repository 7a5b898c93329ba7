//! Minute bar representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An OHLCV bar identified by the instant it closes.
///
/// Bars read from CSV cover one minute. Bars produced by aggregation cover
/// `N` minutes and carry the close time of the last minute in their bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinuteBar {
    /// Close (end) instant of the bar (UTC).
    pub time: DateTime<Utc>,
    /// Opening price.
    pub open: f64,
    /// Highest price during the bar.
    pub high: f64,
    /// Lowest price during the bar.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Traded volume. Not validated, may be `NaN` for malformed input.
    pub volume: f64,
}

impl MinuteBar {
    /// Creates a new bar.
    #[must_use]
    pub const fn new(
        time: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Returns true if open, high, low and close are all finite.
    ///
    /// Volume is deliberately not part of this check.
    #[must_use]
    pub fn has_finite_prices(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
    }
}
