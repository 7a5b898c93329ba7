//! cddbars CLI - Aggregate CryptoDataDownload minute CSVs into fixed-window bars.

use anyhow::Result;
use cddbars_lib::prelude::*;
use cddbars_lib::{BASE_URL, DEFAULT_EXCHANGE};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

mod commands;
mod display;

use display::{Format, Output};

#[derive(Parser)]
#[command(name = "cddbars")]
#[command(about = "Aggregate CryptoDataDownload minute CSVs into fixed-window bars", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Site root for remote downloads
    #[arg(long, env = "CDD_BASE_URL", default_value = BASE_URL, global = true)]
    base_url: String,

    /// Exchange used when a command does not name one
    #[arg(long, env = "CDD_EXCHANGE", default_value = DEFAULT_EXCHANGE, global = true)]
    default_exchange: String,

    /// HTTP request timeout in seconds
    #[arg(long, default_value = "30", global = true)]
    timeout: u64,

    /// Which loads drop bars with unparseable prices (multi-file-only, always, never)
    #[arg(long, default_value = "multi-file-only", global = true)]
    finite: FinitePolicy,
}

/// Options shared by every loading command.
#[derive(Args)]
struct SeriesArgs {
    /// Aggregation window (e.g. 4m, 24, 1h)
    #[arg(long = "tf", default_value = "4m")]
    window: Window,

    /// Write the bars to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (inferred from the output extension when omitted)
    #[arg(short, long, value_enum)]
    format: Option<Format>,
}

impl SeriesArgs {
    fn output(&self) -> Option<Output> {
        self.output
            .as_ref()
            .map(|path| Output::new(path.clone(), self.format))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch {exchange}_{symbol}_{interval}.csv from the remote site
    Remote {
        /// Trading pair (e.g. BTCUSDT)
        symbol: String,

        /// Exchange name as used in file names (defaults to --default-exchange)
        #[arg(short, long)]
        exchange: Option<String>,

        /// Source interval token in the file name
        #[arg(long, default_value = "minute")]
        interval: String,

        #[command(flatten)]
        series: SeriesArgs,
    },

    /// Fetch a CSV from a direct URL
    Url {
        /// CSV address
        url: String,

        /// Series label
        #[arg(short, long)]
        name: String,

        #[command(flatten)]
        series: SeriesArgs,
    },

    /// Read a single local CSV file
    File {
        /// CSV path
        path: PathBuf,

        /// Series label
        #[arg(short, long)]
        name: String,

        #[command(flatten)]
        series: SeriesArgs,
    },

    /// Read every matching minute CSV in a folder
    Folder {
        /// Folder to scan
        dir: PathBuf,

        /// Trading pair (e.g. BTCUSDT)
        symbol: String,

        /// Exchange name as used in file names (defaults to --default-exchange)
        #[arg(short, long)]
        exchange: Option<String>,

        #[command(flatten)]
        series: SeriesArgs,
    },

    /// Read the sample CSVs bundled into this binary
    Bundled {
        /// Trading pair (e.g. BTCUSDT)
        symbol: String,

        /// Bundled directory to scan
        #[arg(short, long, default_value = commands::DEFAULT_BUNDLED_DIR)]
        dir: String,

        /// Exchange name as used in file names (defaults to --default-exchange)
        #[arg(short, long)]
        exchange: Option<String>,

        #[command(flatten)]
        series: SeriesArgs,
    },

    /// List bundled sample files
    BundledList {
        /// Only list entries under this directory
        #[arg(short, long)]
        dir: Option<String>,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn loader(cli: &Cli) -> Result<SeriesLoader> {
    let client = FetchClient::new(ClientConfig {
        timeout: Duration::from_secs(cli.timeout),
        ..ClientConfig::default()
    })?;
    let config = CddConfig {
        base_url: cli.base_url.clone(),
        default_exchange: cli.default_exchange.clone(),
    };
    let options = LoadOptions::default().with_finite(cli.finite);
    Ok(SeriesLoader::new(CddSource::new(client, config), options))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Show help if no command provided
    let Some(command) = &cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Remote {
            symbol,
            exchange,
            interval,
            series,
        } => {
            let loader = loader(&cli)?;
            commands::remote::remote(
                &loader,
                exchange.as_deref(),
                symbol,
                interval,
                series.window,
                series.output(),
            )
            .await
        }
        Commands::Url { url, name, series } => {
            let loader = loader(&cli)?;
            commands::remote::url(&loader, url, name, series.window, series.output()).await
        }
        Commands::File { path, name, series } => {
            commands::local::file(&loader(&cli)?, path, name, series.window, series.output())
        }
        Commands::Folder {
            dir,
            symbol,
            exchange,
            series,
        } => commands::local::folder(
            &loader(&cli)?,
            dir,
            exchange.as_deref(),
            symbol,
            series.window,
            series.output(),
        ),
        Commands::Bundled {
            symbol,
            dir,
            exchange,
            series,
        } => commands::local::bundled(
            &loader(&cli)?,
            dir,
            exchange.as_deref(),
            symbol,
            series.window,
            series.output(),
        ),
        Commands::BundledList { dir } => commands::local::bundled_list(dir.as_deref()),
    }
}
