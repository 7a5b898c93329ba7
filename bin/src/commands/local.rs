//! Local loading commands: files, folders and bundled samples.

use crate::display::{Output, report};
use anyhow::{Result, bail};
use cddbars_lib::prelude::*;
use cddbars_lib::{ResourceSource, parse_minute_bars};
use std::path::Path;

/// Read a single CSV file.
pub(crate) fn file(
    loader: &SeriesLoader,
    path: &Path,
    name: &str,
    window: Window,
    output: Option<Output>,
) -> Result<()> {
    let series = loader.load_file(path, name, window)?;
    report(&series, output.as_ref())
}

/// Read every matching minute CSV in `dir`.
pub(crate) fn folder(
    loader: &SeriesLoader,
    dir: &Path,
    exchange: Option<&str>,
    symbol: &str,
    window: Window,
    output: Option<Output>,
) -> Result<()> {
    let exchange = loader.source().config().exchange_or(exchange);
    let series = loader.load_folder(dir, exchange, symbol, window)?;
    report(&series, output.as_ref())
}

/// Read the matching bundled sample files under `dir`.
pub(crate) fn bundled(
    loader: &SeriesLoader,
    dir: &str,
    exchange: Option<&str>,
    symbol: &str,
    window: Window,
    output: Option<Output>,
) -> Result<()> {
    let exchange = loader.source().config().exchange_or(exchange);
    let series =
        loader.load_resources(BundledResources::global(), dir, exchange, symbol, window)?;
    report(&series, output.as_ref())
}

/// List bundled sample files, optionally under one directory.
pub(crate) fn bundled_list(dir: Option<&str>) -> Result<()> {
    let bundled = BundledResources::global();
    let prefix = dir.map(|d| format!("{}/", d.trim_matches('/')));

    let paths: Vec<&str> = bundled
        .paths()
        .filter(|p| prefix.as_deref().is_none_or(|prefix| p.starts_with(prefix)))
        .collect();

    if paths.is_empty() {
        bail!("No bundled files under {}", dir.unwrap_or("/"));
    }

    println!("{:<60} {:>8}", "PATH", "BARS");
    println!("{}", "-".repeat(69));
    for path in &paths {
        let bytes = bundled.read(path)?;
        let bars = parse_minute_bars(&String::from_utf8_lossy(&bytes)).map_or(0, |b| b.len());
        println!("{path:<60} {bars:>8}");
    }

    println!("\nTotal: {} files", paths.len());
    Ok(())
}
