//! CryptoDataDownload URL construction.

/// Default base URL of the CryptoDataDownload site.
pub const BASE_URL: &str = "https://www.cryptodatadownload.com";

/// Default exchange used when a request names none.
pub const DEFAULT_EXCHANGE: &str = "Binance";

/// Builds a candidate URL from `(base_url, exchange, file_name)`.
pub type UrlTemplate = fn(&str, &str, &str) -> String;

/// Candidate layouts, tried in this order.
pub const CANDIDATE_TEMPLATES: &[UrlTemplate] = &[primary_url, legacy_url];

/// Remote location configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CddConfig {
    /// Site root, without trailing slash.
    pub base_url: String,
    /// Exchange used when callers do not name one.
    pub default_exchange: String,
}

impl Default for CddConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            default_exchange: DEFAULT_EXCHANGE.to_string(),
        }
    }
}

impl CddConfig {
    /// Returns `exchange`, or the configured default when it is `None`.
    #[must_use]
    pub fn exchange_or<'a>(&'a self, exchange: Option<&'a str>) -> &'a str {
        exchange.unwrap_or(self.default_exchange.as_str())
    }

    /// Returns the candidate URLs for a file, in the order they should be tried.
    #[must_use]
    pub fn candidate_urls(&self, exchange: &str, symbol: &str, interval: &str) -> Vec<String> {
        let base = self.base_url.trim_end_matches('/');
        let file = file_name(exchange, symbol, interval);
        CANDIDATE_TEMPLATES
            .iter()
            .map(|template| template(base, exchange, &file))
            .collect()
    }
}

/// Returns the CSV file name for an exchange/symbol/interval triple.
///
/// ```
/// use cddbars_fetch::url::file_name;
///
/// assert_eq!(file_name("Binance", "BTCUSDT", "minute"), "Binance_BTCUSDT_minute.csv");
/// ```
#[must_use]
pub fn file_name(exchange: &str, symbol: &str, interval: &str) -> String {
    format!("{exchange}_{symbol}_{interval}.csv")
}

/// Current layout: `{base}/data/{exchange lowercased}/{file}`.
#[must_use]
pub fn primary_url(base: &str, exchange: &str, file: &str) -> String {
    format!("{base}/data/{}/{file}", exchange.to_lowercase())
}

/// Older layout: `{base}/cdd/{file}`.
#[must_use]
pub fn legacy_url(base: &str, _exchange: &str, file: &str) -> String {
    format!("{base}/cdd/{file}")
}
