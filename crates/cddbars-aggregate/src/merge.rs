//! Multi-file merge with deduplication.

use std::collections::BTreeMap;

use cddbars_types::MinuteBar;
use chrono::{DateTime, Utc};

/// Counters from a merge pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Bars offered to the merge.
    pub read: usize,
    /// Bars discarded for a non-finite open, high, low or close.
    pub non_finite: usize,
    /// Earlier bars replaced by a later bar with the same time.
    pub replaced: usize,
}

/// Merges bars into one ascending, duplicate-free sequence.
///
/// Bars with a non-finite open, high, low or close are discarded. When two
/// bars share a time, the one that comes later in `bars` wins. Volume is not
/// checked.
#[must_use]
pub fn merge_dedup(bars: impl IntoIterator<Item = MinuteBar>) -> Vec<MinuteBar> {
    merge_dedup_with_stats(bars).0
}

/// Like [`merge_dedup`], also returning what was dropped.
#[must_use]
pub fn merge_dedup_with_stats(
    bars: impl IntoIterator<Item = MinuteBar>,
) -> (Vec<MinuteBar>, MergeStats) {
    merge(bars, true)
}

/// Orders and deduplicates bars by time without checking prices.
///
/// Same last-write-wins rule as [`merge_dedup`].
#[must_use]
pub fn dedup_by_time(bars: impl IntoIterator<Item = MinuteBar>) -> (Vec<MinuteBar>, MergeStats) {
    merge(bars, false)
}

fn merge(
    bars: impl IntoIterator<Item = MinuteBar>,
    drop_non_finite: bool,
) -> (Vec<MinuteBar>, MergeStats) {
    let mut stats = MergeStats::default();
    let mut by_time: BTreeMap<DateTime<Utc>, MinuteBar> = BTreeMap::new();

    for bar in bars {
        stats.read += 1;
        if drop_non_finite && !bar.has_finite_prices() {
            stats.non_finite += 1;
            continue;
        }
        if by_time.insert(bar.time, bar).is_some() {
            stats.replaced += 1;
        }
    }

    tracing::debug!(
        read = stats.read,
        non_finite = stats.non_finite,
        replaced = stats.replaced,
        kept = by_time.len(),
        "merged bars"
    );

    (by_time.into_values().collect(), stats)
}

/// Drops bars with a non-finite open, high, low or close, keeping order and
/// duplicates.
#[must_use]
pub fn retain_finite(mut bars: Vec<MinuteBar>) -> Vec<MinuteBar> {
    bars.retain(MinuteBar::has_finite_prices);
    bars
}
