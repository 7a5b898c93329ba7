//! Resolution of CSV sources into parsed minute bars.

use std::future::Future;
use std::path::Path;

use cddbars_types::{CddError, MinuteBar};

use crate::resources::{self, ResourceSource};
use crate::{CddConfig, FetchClient, FilePattern, parse_minute_bars};

/// Runs `attempt` on each candidate in order.
///
/// Returns the first success, or the error of the last candidate tried.
/// Returns `None` only when `candidates` is empty.
pub async fn try_in_order<C, T, E, F, Fut>(
    candidates: impl IntoIterator<Item = C>,
    mut attempt: F,
) -> Option<Result<T, E>>
where
    F: FnMut(C) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut last = None;
    for candidate in candidates {
        match attempt(candidate).await {
            Ok(value) => return Some(Ok(value)),
            Err(e) => last = Some(Err(e)),
        }
    }
    last
}

/// Remote CSV source: an HTTP client plus the site layout it targets.
#[derive(Debug, Clone)]
pub struct CddSource {
    client: FetchClient,
    config: CddConfig,
}

impl CddSource {
    /// Creates a source from an explicitly constructed client.
    #[must_use]
    pub const fn new(client: FetchClient, config: CddConfig) -> Self {
        Self { client, config }
    }

    /// Creates a source with a default client and configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self, reqwest::Error> {
        Ok(Self::new(FetchClient::with_defaults()?, CddConfig::default()))
    }

    /// Returns the remote configuration.
    #[must_use]
    pub const fn config(&self) -> &CddConfig {
        &self.config
    }

    /// Returns the underlying fetch client.
    #[must_use]
    pub const fn client(&self) -> &FetchClient {
        &self.client
    }

    /// Fetches `{exchange}_{symbol}_{interval}.csv`, trying each candidate URL
    /// layout in order.
    ///
    /// A candidate fails if the download fails or its body does not parse.
    ///
    /// # Errors
    ///
    /// Returns the last candidate's error when every candidate fails.
    pub async fn fetch_minute_bars(
        &self,
        exchange: &str,
        symbol: &str,
        interval: &str,
    ) -> Result<Vec<MinuteBar>, CddError> {
        let candidates = self.config.candidate_urls(exchange, symbol, interval);

        try_in_order(candidates, |url| async move {
            let result = self.download_and_parse(&url).await;
            if let Err(e) = &result {
                tracing::warn!(%url, error = %e, "candidate URL failed");
            }
            result
        })
        .await
        .unwrap_or_else(|| {
            Err(CddError::unavailable(
                crate::url::file_name(exchange, symbol, interval),
                "no candidate URLs configured",
            ))
        })
    }

    /// Fetches and parses a fully specified URL with a single attempt.
    ///
    /// # Errors
    ///
    /// Returns [`CddError::SourceUnavailable`] on a non-200 status or
    /// transport failure, or a parse error from the body.
    pub async fn fetch_from_url(&self, url: &str) -> Result<Vec<MinuteBar>, CddError> {
        self.download_and_parse(url).await
    }

    async fn download_and_parse(&self, url: &str) -> Result<Vec<MinuteBar>, CddError> {
        tracing::debug!(%url, "fetching CSV");
        let body = self.client.fetch(url).await?;
        let bars = parse_minute_bars(&String::from_utf8_lossy(&body))?;
        tracing::debug!(%url, bars = bars.len(), "parsed CSV");
        Ok(bars)
    }
}

/// Reads and parses a single local CSV file.
///
/// # Errors
///
/// Returns [`CddError::SourceUnavailable`] if the file cannot be read, or a
/// parse error from its contents.
pub fn read_path(path: &Path) -> Result<Vec<MinuteBar>, CddError> {
    let bytes =
        std::fs::read(path).map_err(|e| CddError::unavailable(path.display().to_string(), e))?;
    let bars = parse_minute_bars(&String::from_utf8_lossy(&bytes))?;
    tracing::debug!(path = %path.display(), bars = bars.len(), "parsed file");
    Ok(bars)
}

/// Reads every file in `folder` matching the naming pattern.
///
/// Matching files are ordered by case-folded name and their bars concatenated
/// in that order. The result is not deduplicated.
///
/// # Errors
///
/// Returns [`CddError::SourceUnavailable`] if the folder does not exist and
/// [`CddError::NoMatchingFiles`] if nothing in it matches.
pub fn read_folder(
    folder: &Path,
    exchange: &str,
    symbol: &str,
    interval: &str,
) -> Result<Vec<MinuteBar>, CddError> {
    let pattern = FilePattern::new(exchange, symbol, interval);
    let location = std::path::absolute(folder).unwrap_or_else(|_| folder.to_path_buf());

    if !folder.is_dir() {
        return Err(CddError::unavailable(
            location.display().to_string(),
            "folder not found",
        ));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if pattern.matches(&name) {
            files.push((FilePattern::sort_key(&name), entry.path()));
        }
    }

    if files.is_empty() {
        return Err(CddError::NoMatchingFiles {
            pattern: pattern.to_string(),
            location: location.display().to_string(),
        });
    }
    files.sort();
    tracing::debug!(folder = %location.display(), files = files.len(), "matched files");

    let mut bars = Vec::new();
    for (_, path) in &files {
        bars.extend(read_path(path)?);
    }
    Ok(bars)
}

/// Reads every entry under `dir` in a resource tree matching the naming pattern.
///
/// Same ordering and concatenation rules as [`read_folder`].
///
/// # Errors
///
/// Returns [`CddError::SourceUnavailable`] if the directory does not exist and
/// [`CddError::NoMatchingFiles`] if nothing in it matches.
pub fn read_resource_dir(
    resources: &dyn ResourceSource,
    dir: &str,
    exchange: &str,
    symbol: &str,
    interval: &str,
) -> Result<Vec<MinuteBar>, CddError> {
    let pattern = FilePattern::new(exchange, symbol, interval);

    let mut names: Vec<String> = resources
        .list(dir)?
        .into_iter()
        .filter(|name| pattern.matches(name))
        .collect();

    if names.is_empty() {
        return Err(CddError::NoMatchingFiles {
            pattern: pattern.to_string(),
            location: format!("resource:{dir}"),
        });
    }
    names.sort_by_cached_key(|name| FilePattern::sort_key(name));
    tracing::debug!(dir, files = names.len(), "matched resources");

    let mut bars = Vec::new();
    for name in &names {
        let bytes = resources.read(&resources::join(dir, name))?;
        let parsed = parse_minute_bars(&String::from_utf8_lossy(&bytes))?;
        tracing::debug!(resource = %name, bars = parsed.len(), "parsed resource");
        bars.extend(parsed);
    }
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BundledResources, ClientConfig};
    use httpmock::prelude::*;

    const CSV: &str = "unix,open,high,low,close,volume\n120,2,3,1,2.5,7\n60,1,2,0,1.5,5\n";

    fn source_for(server: &MockServer) -> CddSource {
        let config = CddConfig {
            base_url: server.base_url(),
            ..CddConfig::default()
        };
        CddSource::new(FetchClient::new(ClientConfig::default()).unwrap(), config)
    }

    #[tokio::test]
    async fn test_try_in_order() {
        let first_ok = try_in_order([1, 2, 3], |n| async move {
            if n >= 2 { Ok(n) } else { Err(n) }
        })
        .await;
        assert_eq!(first_ok, Some(Ok(2)));

        let last_err = try_in_order([1, 2, 3], |n| async move { Err::<(), _>(n) }).await;
        assert_eq!(last_err, Some(Err(3)));

        let none = try_in_order(Vec::<u8>::new(), |n| async move { Ok::<_, ()>(n) }).await;
        assert_eq!(none, None);
    }

    #[tokio::test]
    async fn test_primary_candidate_wins() {
        let server = MockServer::start_async().await;
        let primary = server
            .mock_async(|when, then| {
                when.method(GET).path("/data/binance/Binance_BTCUSDT_minute.csv");
                then.status(200).body(CSV);
            })
            .await;
        let legacy = server
            .mock_async(|when, then| {
                when.method(GET).path("/cdd/Binance_BTCUSDT_minute.csv");
                then.status(200).body(CSV);
            })
            .await;

        let bars = source_for(&server)
            .fetch_minute_bars("Binance", "BTCUSDT", "minute")
            .await
            .unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].time.timestamp(), 60);
        primary.assert_async().await;
        legacy.assert_calls_async(0).await;
    }

    #[tokio::test]
    async fn test_falls_back_to_legacy() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/data/binance/Binance_BTCUSDT_minute.csv");
                then.status(404);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/cdd/Binance_BTCUSDT_minute.csv");
                then.status(200).body(CSV);
            })
            .await;

        let bars = source_for(&server)
            .fetch_minute_bars("Binance", "BTCUSDT", "minute")
            .await
            .unwrap();
        assert_eq!(bars.len(), 2);
    }

    #[tokio::test]
    async fn test_all_candidates_fail_reports_last() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/data/binance/Binance_BTCUSDT_minute.csv");
                then.status(500);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/cdd/Binance_BTCUSDT_minute.csv");
                then.status(404);
            })
            .await;

        let err = source_for(&server)
            .fetch_minute_bars("Binance", "BTCUSDT", "minute")
            .await
            .unwrap_err();

        match err {
            CddError::SourceUnavailable {
                source_name,
                reason,
            } => {
                assert!(source_name.ends_with("/cdd/Binance_BTCUSDT_minute.csv"));
                assert!(reason.contains("404"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_schema_failure_tries_next_candidate() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/data/binance/Binance_BTCUSDT_minute.csv");
                then.status(200).body("<html>not found</html>");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/cdd/Binance_BTCUSDT_minute.csv");
                then.status(200).body(CSV);
            })
            .await;

        let bars = source_for(&server)
            .fetch_minute_bars("Binance", "BTCUSDT", "minute")
            .await
            .unwrap();
        assert_eq!(bars.len(), 2);
    }

    #[tokio::test]
    async fn test_direct_url_single_attempt() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/sample.csv");
                then.status(503);
            })
            .await;

        let url = server.url("/sample.csv");
        let err = source_for(&server).fetch_from_url(&url).await.unwrap_err();

        mock.assert_calls_async(1).await;
        assert!(err.is_unavailable());
        assert!(err.to_string().contains(&url));
    }

    #[test]
    fn test_read_path_missing() {
        let err = read_path(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(err.is_unavailable());
        assert!(err.to_string().contains("/definitely/not/here.csv"));
    }

    #[test]
    fn test_read_folder_orders_and_filters() {
        let tmp = tempfile::tempdir().unwrap();
        let write = |name: &str, body: &str| std::fs::write(tmp.path().join(name), body).unwrap();
        write(
            "binance_BTCUSDT_2021_minute.csv",
            "unix,open,high,low,close,volume\n180,3,3,3,3,3\n",
        );
        write(
            "Binance_BTCUSDT_2020_minute.csv",
            "unix,open,high,low,close,volume\n120,2,2,2,2,2\n60,1,1,1,1,1\n",
        );
        write(
            "Binance_ETHUSDT_2020_minute.csv",
            "unix,open,high,low,close,volume\n1,9,9,9,9,9\n",
        );
        write("notes.txt", "ignore me");

        let bars = read_folder(tmp.path(), "Binance", "BTCUSDT", "minute").unwrap();
        let times: Vec<i64> = bars.iter().map(|b| b.time.timestamp()).collect();
        assert_eq!(times, vec![60, 120, 180]);
    }

    #[test]
    fn test_read_folder_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let err = read_folder(tmp.path(), "Binance", "BTCUSDT", "minute").unwrap_err();
        match err {
            CddError::NoMatchingFiles { pattern, .. } => {
                assert_eq!(pattern, "Binance_BTCUSDT[_<YYYY>[-<MM>]]_minute.csv");
            }
            other => panic!("unexpected error: {other}"),
        }

        let missing = tmp.path().join("missing");
        let err = read_folder(&missing, "Binance", "BTCUSDT", "minute").unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_read_bundled_resources() {
        let bars = read_resource_dir(
            BundledResources::global(),
            "sample/BinanceBTCData",
            "Binance",
            "BTCUSDT",
            "minute",
        )
        .unwrap();
        // 12 rows from August then 14 from September, overlap kept
        assert_eq!(bars.len(), 26);
        assert!(bars.iter().all(|b| b.open > 50_000.0));

        let err = read_resource_dir(
            BundledResources::global(),
            "sample/BinanceBTCData",
            "Binance",
            "SOLUSDT",
            "minute",
        )
        .unwrap_err();
        assert!(matches!(err, CddError::NoMatchingFiles { .. }));
    }
}
