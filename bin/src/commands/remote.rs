//! Remote loading commands.
//!
//! Both commands download a single CSV and aggregate it without the
//! multi-file merge.

use crate::display::{Output, report};
use anyhow::{Context, Result};
use cddbars_lib::prelude::*;

/// Fetch `{exchange}_{symbol}_{interval}.csv`, trying each candidate URL.
pub(crate) async fn remote(
    loader: &SeriesLoader,
    exchange: Option<&str>,
    symbol: &str,
    interval: &str,
    window: Window,
    output: Option<Output>,
) -> Result<()> {
    let exchange = loader.source().config().exchange_or(exchange);
    let series = loader
        .fetch_series(exchange, symbol, interval, window)
        .await
        .with_context(|| format!("Failed to load {exchange} {symbol} {interval} data"))?;
    report(&series, output.as_ref())
}

/// Fetch a CSV from a direct URL.
pub(crate) async fn url(
    loader: &SeriesLoader,
    url: &str,
    name: &str,
    window: Window,
    output: Option<Output>,
) -> Result<()> {
    let series = loader.fetch_series_from_url(url, name, window).await?;
    report(&series, output.as_ref())
}
