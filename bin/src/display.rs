//! Display utilities and output formatting for the cddbars CLI.

use anyhow::{Result, bail};
use cddbars_lib::prelude::*;
use clap::ValueEnum;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Output format for written bars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    Csv,
    Json,
    Ndjson,
    Parquet,
}

impl Format {
    /// Returns the file extension for this format.
    pub(crate) const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Ndjson => "ndjson",
            Self::Parquet => "parquet",
        }
    }

    /// Guesses the format from a file extension, falling back to CSV.
    pub(crate) fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse::<OutputFormat>().ok());
        match ext {
            Some(OutputFormat::Json) => Self::Json,
            Some(OutputFormat::Ndjson) => Self::Ndjson,
            Some(OutputFormat::Parquet) => Self::Parquet,
            Some(OutputFormat::Csv) | None => Self::Csv,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Where and how to write a series.
#[derive(Debug, Clone)]
pub(crate) struct Output {
    pub(crate) path: PathBuf,
    pub(crate) format: Format,
}

impl Output {
    pub(crate) fn new(path: PathBuf, format: Option<Format>) -> Self {
        let format = format.unwrap_or_else(|| Format::from_path(&path));
        Self { path, format }
    }
}

/// Write bars to a file in the specified format.
pub(crate) fn write_bars(bars: &[MinuteBar], output: &Output) -> Result<()> {
    let file = File::create(&output.path)?;
    let writer = BufWriter::new(file);

    match output.format {
        Format::Csv => {
            let formatter = CsvFormatter::new();
            formatter.write_bars(bars, writer)?;
        }
        Format::Json => {
            let formatter = JsonFormatter::new();
            formatter.write_bars(bars, writer)?;
        }
        Format::Ndjson => {
            let formatter = JsonFormatter::ndjson();
            formatter.write_bars(bars, writer)?;
        }
        Format::Parquet => {
            #[cfg(feature = "parquet")]
            {
                let formatter = ParquetFormatter::new();
                formatter.write_bars(bars, writer)?;
            }
            #[cfg(not(feature = "parquet"))]
            {
                drop(writer);
                bail!("Parquet support not compiled in");
            }
        }
    }

    Ok(())
}

/// Prints the series summary and writes the bars if an output was requested.
pub(crate) fn report(series: &BarSeries, output: Option<&Output>) -> Result<()> {
    println!("Series:     {}", series.name);
    println!("Window:     {}", series.window);
    println!("Bars:       {}", series.len());
    match (series.last_close(), series.last_time()) {
        (Some(close), Some(time)) => {
            println!("Last close: {close}");
            println!("Last time:  {}", time.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        _ => println!("Last close: -"),
    }

    if let Some(output) = output {
        if series.is_empty() {
            bail!("No complete {} bars to write", series.window);
        }
        write_bars(&series.bars, output)?;
        println!(
            "\nWrote {} bars to {} ({})",
            series.len(),
            output.path.display(),
            output.format
        );
    }
    Ok(())
}
