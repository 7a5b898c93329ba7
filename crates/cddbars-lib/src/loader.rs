//! End-to-end loading: resolve, parse, merge, aggregate.

use std::path::Path;

use cddbars_aggregate::{aggregate, dedup_by_time, merge_dedup_with_stats, retain_finite};
use cddbars_fetch::{CddSource, ResourceSource, read_folder, read_path, read_resource_dir};
use cddbars_types::{CddError, MinuteBar, Result, Window};

use crate::{BarSeries, LoadOptions};

/// Interval token used by folder and resource loads.
pub const LOCAL_INTERVAL: &str = "minute";

/// Loads minute CSVs from any supported origin into a [`BarSeries`].
#[derive(Debug, Clone)]
pub struct SeriesLoader {
    source: CddSource,
    options: LoadOptions,
}

impl SeriesLoader {
    /// Creates a loader around an explicitly constructed remote source.
    #[must_use]
    pub const fn new(source: CddSource, options: LoadOptions) -> Self {
        Self { source, options }
    }

    /// Creates a loader with a default HTTP client, site layout and options.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self> {
        let source =
            CddSource::with_defaults().map_err(|e| CddError::unavailable("HTTP client", e))?;
        Ok(Self::new(source, LoadOptions::default()))
    }

    /// Returns the remote source.
    #[must_use]
    pub const fn source(&self) -> &CddSource {
        &self.source
    }

    /// Returns the load options.
    #[must_use]
    pub const fn options(&self) -> LoadOptions {
        self.options
    }

    /// Fetches `{exchange}_{symbol}_{interval}.csv` from the remote site.
    ///
    /// The series is labelled `{symbol}-{N}m-cdd`.
    ///
    /// # Errors
    ///
    /// Returns [`CddError::SourceUnavailable`] with the last candidate's
    /// failure if no candidate URL could be fetched and parsed.
    pub async fn fetch_series(
        &self,
        exchange: &str,
        symbol: &str,
        interval: &str,
        window: Window,
    ) -> Result<BarSeries> {
        let bars = self
            .source
            .fetch_minute_bars(exchange, symbol, interval)
            .await?;
        let name = format!("{symbol}-{}m-cdd", window.minutes());
        Ok(self.single_file(name, bars, window))
    }

    /// Fetches a CSV from a fully specified URL.
    ///
    /// # Errors
    ///
    /// Returns [`CddError::SourceUnavailable`] on a non-200 status or
    /// transport failure.
    pub async fn fetch_series_from_url(
        &self,
        url: &str,
        name: &str,
        window: Window,
    ) -> Result<BarSeries> {
        let bars = self.source.fetch_from_url(url).await?;
        Ok(self.single_file(name.to_string(), bars, window))
    }

    /// Reads a single local CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`CddError::SourceUnavailable`] if the file cannot be read.
    pub fn load_file(&self, path: &Path, name: &str, window: Window) -> Result<BarSeries> {
        let bars = read_path(path)?;
        Ok(self.single_file(name.to_string(), bars, window))
    }

    /// Reads every `{exchange}_{symbol}[_YYYY[-MM]]_minute.csv` in `folder`.
    ///
    /// The series is labelled `{symbol}-{N}m-local`.
    ///
    /// # Errors
    ///
    /// Returns [`CddError::SourceUnavailable`] if the folder is missing and
    /// [`CddError::NoMatchingFiles`] if no file matches.
    pub fn load_folder(
        &self,
        folder: &Path,
        exchange: &str,
        symbol: &str,
        window: Window,
    ) -> Result<BarSeries> {
        let bars = read_folder(folder, exchange, symbol, LOCAL_INTERVAL)?;
        Ok(self.multi_file(symbol, bars, window))
    }

    /// Reads every matching entry under `dir` in a resource tree.
    ///
    /// The series is labelled `{symbol}-{N}m-local`.
    ///
    /// # Errors
    ///
    /// Returns [`CddError::SourceUnavailable`] if the directory is missing and
    /// [`CddError::NoMatchingFiles`] if no entry matches.
    pub fn load_resources(
        &self,
        resources: &dyn ResourceSource,
        dir: &str,
        exchange: &str,
        symbol: &str,
        window: Window,
    ) -> Result<BarSeries> {
        let bars = read_resource_dir(resources, dir, exchange, symbol, LOCAL_INTERVAL)?;
        Ok(self.multi_file(symbol, bars, window))
    }

    fn single_file(&self, name: String, bars: Vec<MinuteBar>, window: Window) -> BarSeries {
        let bars = if self.options.finite.filters(false) {
            retain_finite(bars)
        } else {
            bars
        };
        finish(name, &bars, window)
    }

    fn multi_file(&self, symbol: &str, bars: Vec<MinuteBar>, window: Window) -> BarSeries {
        let (merged, stats) = if self.options.finite.filters(true) {
            merge_dedup_with_stats(bars)
        } else {
            dedup_by_time(bars)
        };
        if stats.non_finite > 0 {
            tracing::info!(dropped = stats.non_finite, "dropped bars with non-finite prices");
        }
        finish(format!("{symbol}-{}m-local", window.minutes()), &merged, window)
    }
}

fn finish(name: String, bars: &[MinuteBar], window: Window) -> BarSeries {
    let out = aggregate(bars, window).into_owned();
    tracing::debug!(%name, minute_bars = bars.len(), bars = out.len(), "built series");
    BarSeries::new(name, window, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FinitePolicy;
    use approx::assert_relative_eq;
    use cddbars_fetch::{BundledResources, CddConfig, ClientConfig, DirResources, FetchClient};
    use chrono::{TimeZone, Utc};
    use httpmock::prelude::*;

    const SAMPLE: &str = include_str!("../../cddbars-fetch/data/sample/Binance_BTCUSDT_minute.csv");
    const BUNDLED_DIR: &str = "sample/BinanceBTCData";

    fn loader_for(server: &MockServer, options: LoadOptions) -> SeriesLoader {
        let config = CddConfig {
            base_url: server.base_url(),
            ..CddConfig::default()
        };
        let client = FetchClient::new(ClientConfig::default()).unwrap();
        SeriesLoader::new(CddSource::new(client, config), options)
    }

    fn offline(options: LoadOptions) -> SeriesLoader {
        let client = FetchClient::new(ClientConfig::default()).unwrap();
        SeriesLoader::new(CddSource::new(client, CddConfig::default()), options)
    }

    fn window(n: u32) -> Window {
        Window::from_minutes(n).unwrap()
    }

    #[tokio::test]
    async fn test_remote_series_four_minutes() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/data/binance/Binance_BTCUSDT_minute.csv");
                then.status(200).body(SAMPLE);
            })
            .await;

        let series = loader_for(&server, LoadOptions::default())
            .fetch_series("Binance", "BTCUSDT", "minute", window(4))
            .await
            .unwrap();

        assert_eq!(series.name, "BTCUSDT-4m-cdd");
        assert_eq!(series.len(), 2);
        let first = series.bars[0];
        assert_eq!(first.time, Utc.with_ymd_and_hms(2024, 8, 23, 0, 3, 0).unwrap());
        assert_relative_eq!(first.open, 100.0);
        assert_relative_eq!(first.high, 105.0);
        assert_relative_eq!(first.low, 98.0);
        assert_relative_eq!(first.close, 103.5);
        assert_relative_eq!(first.volume, 46.0);
        assert_relative_eq!(series.last_close().unwrap(), 107.5);
        assert_relative_eq!(series.bars[1].volume, 62.0);
    }

    #[tokio::test]
    async fn test_url_series_window_too_large() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/sample.csv");
                then.status(200).body(SAMPLE);
            })
            .await;

        let series = loader_for(&server, LoadOptions::default())
            .fetch_series_from_url(&server.url("/sample.csv"), "my-label", window(24))
            .await
            .unwrap();

        assert_eq!(series.name, "my-label");
        assert!(series.is_empty());
    }

    #[tokio::test]
    async fn test_url_series_unavailable() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/gone.csv");
                then.status(404);
            })
            .await;

        let err = loader_for(&server, LoadOptions::default())
            .fetch_series_from_url(&server.url("/gone.csv"), "gone", window(4))
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_bundled_series() {
        let series = offline(LoadOptions::default())
            .load_resources(
                BundledResources::global(),
                BUNDLED_DIR,
                "Binance",
                "BTCUSDT",
                window(4),
            )
            .unwrap();

        assert_eq!(series.name, "BTCUSDT-4m-local");
        assert_eq!(series.len(), 6);
        let first = series.bars[0];
        assert_eq!(first.time, Utc.with_ymd_and_hms(2024, 8, 31, 23, 53, 0).unwrap());
        assert_relative_eq!(first.open, 59000.0);
        assert_relative_eq!(first.high, 59006.0);
        assert_relative_eq!(first.low, 58999.0);
        assert_relative_eq!(first.close, 59004.5);
        assert_relative_eq!(first.volume, 8.0);
    }

    #[test]
    fn test_bundled_series_single_bucket() {
        let series = offline(LoadOptions::default())
            .load_resources(
                BundledResources::global(),
                BUNDLED_DIR,
                "Binance",
                "BTCUSDT",
                window(24),
            )
            .unwrap();

        assert_eq!(series.name, "BTCUSDT-24m-local");
        assert_eq!(series.len(), 1);
        let bar = series.bars[0];
        assert_eq!(bar.time, Utc.with_ymd_and_hms(2024, 9, 1, 0, 13, 0).unwrap());
        assert_relative_eq!(bar.open, 59000.0);
        assert_relative_eq!(bar.close, 59024.5);
        assert_relative_eq!(bar.high, 59026.0);
        assert_relative_eq!(bar.low, 58999.0);
        assert_relative_eq!(bar.volume, 98.0);
    }

    #[test]
    fn test_bundled_identity_window_is_merged() {
        let series = offline(LoadOptions::default())
            .load_resources(
                BundledResources::global(),
                BUNDLED_DIR,
                "Binance",
                "BTCUSDT",
                Window::MINUTE,
            )
            .unwrap();

        assert_eq!(series.name, "BTCUSDT-1m-local");
        assert_eq!(series.len(), 24);
        assert!(series.bars.windows(2).all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn test_folder_series_filters_and_dedups() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("Binance_BTCUSDT_2024-01_minute.csv"),
            "unix,open,high,low,close,volume\n60,1,2,0,1,1\n120,2,3,1,abc,1\n180,3,4,2,3,1\n",
        )
        .unwrap();
        std::fs::write(
            tmp.path().join("Binance_BTCUSDT_2024-02_minute.csv"),
            "unix,open,high,low,close,volume\n180,3,4,2,3,9\n240,4,5,3,4,1\n",
        )
        .unwrap();

        let series = offline(LoadOptions::default())
            .load_folder(tmp.path(), "Binance", "BTCUSDT", Window::MINUTE)
            .unwrap();
        let times: Vec<i64> = series.bars.iter().map(|b| b.time.timestamp()).collect();
        assert_eq!(times, vec![60, 180, 240]);
        assert_relative_eq!(series.bars[1].volume, 9.0);

        let kept = offline(LoadOptions::default().with_finite(FinitePolicy::Never))
            .load_folder(tmp.path(), "Binance", "BTCUSDT", Window::MINUTE)
            .unwrap();
        assert_eq!(kept.len(), 4);
        assert!(kept.bars[1].close.is_nan());
    }

    #[test]
    fn test_single_file_keeps_nan_by_default() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("one.csv");
        std::fs::write(
            &path,
            "unix,open,high,low,close,volume\n60,1,2,0,1,1\n120,2,3,1,abc,1\n",
        )
        .unwrap();

        let series = offline(LoadOptions::default())
            .load_file(&path, "one", Window::MINUTE)
            .unwrap();
        assert_eq!(series.len(), 2);
        assert!(series.bars[1].close.is_nan());

        let filtered = offline(LoadOptions::default().with_finite(FinitePolicy::Always))
            .load_file(&path, "one", Window::MINUTE)
            .unwrap();
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_dir_resources_match_folder() {
        let tmp = tempfile::tempdir().unwrap();
        let data = tmp.path().join("data");
        std::fs::create_dir(&data).unwrap();
        std::fs::write(
            data.join("binance_ethusdt_minute.csv"),
            "timestamp,open,high,low,close,volume\n2024-01-01 00:01:00,1,1,1,1,1\n2024-01-01 00:00:00,1,1,1,1,1\n",
        )
        .unwrap();

        let loader = offline(LoadOptions::default());
        let from_dir = loader
            .load_resources(
                &DirResources::new(tmp.path()),
                "data",
                "Binance",
                "ETHUSDT",
                window(2),
            )
            .unwrap();
        let from_folder = loader
            .load_folder(&data, "Binance", "ETHUSDT", window(2))
            .unwrap();
        assert_eq!(from_dir, from_folder);
        assert_eq!(from_dir.name, "ETHUSDT-2m-local");
        assert_eq!(from_dir.len(), 1);
    }

    #[test]
    fn test_missing_folder() {
        let err = offline(LoadOptions::default())
            .load_folder(Path::new("/no/such/folder"), "Binance", "BTCUSDT", window(4))
            .unwrap_err();
        assert!(err.is_unavailable());
    }
}
