//! File name matching for multi-file loads.

/// Case-insensitive predicate for `exchange_symbol[_YYYY[-MM]]_interval.csv`.
///
/// The exchange, symbol and interval are literal tokens. This type does no
/// I/O; the same predicate filters directory listings and bundled resources.
///
/// ```
/// use cddbars_fetch::FilePattern;
///
/// let pattern = FilePattern::new("Binance", "BTCUSDT", "minute");
/// assert!(pattern.matches("Binance_BTCUSDT_minute.csv"));
/// assert!(pattern.matches("binance_btcusdt_2020-01_minute.CSV"));
/// assert!(!pattern.matches("Binance_ETHUSDT_minute.csv"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePattern {
    exchange: String,
    symbol: String,
    interval: String,
    prefix: String,
    suffix: String,
}

impl FilePattern {
    /// Creates a pattern for the given tokens.
    #[must_use]
    pub fn new(exchange: &str, symbol: &str, interval: &str) -> Self {
        Self {
            exchange: exchange.to_string(),
            symbol: symbol.to_string(),
            interval: interval.to_string(),
            prefix: format!("{exchange}_{symbol}").to_lowercase(),
            suffix: format!("_{interval}.csv").to_lowercase(),
        }
    }

    /// Returns true if `file_name` (without directory) matches.
    #[must_use]
    pub fn matches(&self, file_name: &str) -> bool {
        let name = file_name.to_lowercase();
        name.strip_prefix(&self.prefix)
            .and_then(|rest| rest.strip_suffix(&self.suffix))
            .is_some_and(is_period_token)
    }

    /// Returns the sort key used to order matching files.
    #[must_use]
    pub fn sort_key(file_name: &str) -> String {
        file_name.to_lowercase()
    }
}

impl std::fmt::Display for FilePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}_{}[_<YYYY>[-<MM>]]_{}.csv",
            self.exchange, self.symbol, self.interval
        )
    }
}

/// Accepts the optional period between symbol and interval:
/// nothing, `_YYYY` or `_YYYY-MM`.
fn is_period_token(middle: &str) -> bool {
    if middle.is_empty() {
        return true;
    }
    let Some(period) = middle.strip_prefix('_') else {
        return false;
    };
    let digits = |s: &str, n: usize| s.len() == n && s.bytes().all(|b| b.is_ascii_digit());
    match period.split_once('-') {
        None => digits(period, 4),
        Some((year, month)) => digits(year, 4) && digits(month, 2),
    }
}
