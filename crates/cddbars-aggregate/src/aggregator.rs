//! Fixed-window aggregation of minute bars.

use std::borrow::Cow;

use cddbars_types::{MinuteBar, Window};

/// Streaming positional aggregator.
///
/// Every `N` bars fed to [`process`](Self::process) produce one aggregated
/// bar. Buckets are formed by position only; gaps in the input are not
/// detected.
#[derive(Debug)]
pub struct BarAggregator {
    window: Window,
    current: Option<BarBuilder>,
}

impl BarAggregator {
    /// Creates a new aggregator for the given window.
    #[must_use]
    pub const fn new(window: Window) -> Self {
        Self {
            window,
            current: None,
        }
    }

    /// Returns the window being aggregated to.
    #[must_use]
    pub const fn window(&self) -> Window {
        self.window
    }

    /// Returns how many bars are buffered in the incomplete bucket.
    #[must_use]
    pub fn pending(&self) -> u32 {
        self.current.as_ref().map_or(0, |b| b.count)
    }

    /// Processes a bar, emitting the aggregate when its bucket fills.
    pub fn process(&mut self, bar: MinuteBar) -> Option<MinuteBar> {
        let builder = match self.current.take() {
            Some(mut builder) => {
                builder.update(&bar);
                builder
            }
            None => BarBuilder::new(&bar),
        };

        if builder.count == self.window.minutes() {
            Some(builder.finish())
        } else {
            self.current = Some(builder);
            None
        }
    }

    /// Finishes aggregation, discarding any incomplete bucket.
    ///
    /// Returns the number of bars that were dropped.
    pub fn finish(self) -> u32 {
        self.pending()
    }
}

/// Accumulates one bucket.
#[derive(Debug)]
struct BarBuilder {
    time: chrono::DateTime<chrono::Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    count: u32,
}

impl BarBuilder {
    /// Starts a bucket from its first bar.
    const fn new(bar: &MinuteBar) -> Self {
        Self {
            time: bar.time,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            count: 1,
        }
    }

    /// Folds the next bar of the bucket in.
    fn update(&mut self, bar: &MinuteBar) {
        self.time = bar.time;
        self.high = max_or_nan(self.high, bar.high);
        self.low = min_or_nan(self.low, bar.low);
        self.close = bar.close;
        self.volume += bar.volume;
        self.count += 1;
    }

    const fn finish(self) -> MinuteBar {
        MinuteBar::new(
            self.time, self.open, self.high, self.low, self.close, self.volume,
        )
    }
}

/// Like `f64::max`, but NaN in either operand yields NaN.
fn max_or_nan(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() { f64::NAN } else { a.max(b) }
}

/// Like `f64::min`, but NaN in either operand yields NaN.
fn min_or_nan(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() { f64::NAN } else { a.min(b) }
}

/// Aggregates an ascending sequence of minute bars into `window`-minute bars.
///
/// Each complete run of `N` consecutive bars becomes one bar: time and close
/// from the last bar, open from the first, the maximum high, the minimum low
/// and the summed volume. A NaN high or low anywhere in a run makes that
/// extreme NaN. A trailing run shorter than `N` is dropped.
///
/// A one-minute window returns the input borrowed and unchanged.
#[must_use]
pub fn aggregate(bars: &[MinuteBar], window: Window) -> Cow<'_, [MinuteBar]> {
    if window.is_identity() {
        return Cow::Borrowed(bars);
    }

    let mut aggregator = BarAggregator::new(window);
    let out: Vec<MinuteBar> = bars.iter().filter_map(|b| aggregator.process(*b)).collect();

    let dropped = aggregator.finish();
    if dropped > 0 {
        tracing::debug!(dropped, window = %window, "dropped partial trailing bucket");
    }

    Cow::Owned(out)
}
