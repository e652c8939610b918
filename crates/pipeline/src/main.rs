//! newsprice CLI
//!
//! Builds a dataset of news items labeled with the price move that followed
//! them.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use newsprice_core::config::PriceField;
use newsprice_core::Config;
use newsprice_pipeline::{prepare_from_snapshots, Pipeline, YahooClient};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "newsprice")]
#[command(about = "Label news items with the price move that followed them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch prices and news, align them and save the dataset
    Run {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Fetch and save raw price/news snapshots only
    Fetch {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Build the dataset from previously saved snapshots
    Prepare {
        #[command(flatten)]
        overrides: Overrides,
    },
}

/// Command-line overrides of config file values.
#[derive(Args, Debug, Default)]
struct Overrides {
    /// Ticker symbol (e.g., BTC-USD)
    #[arg(short, long)]
    symbol: Option<String>,

    /// Lookback period (e.g., 60d, 1mo)
    #[arg(long)]
    period: Option<String>,

    /// Sampling interval (e.g., 1m, 5m)
    #[arg(long)]
    interval: Option<String>,

    /// Number of news items to request
    #[arg(long)]
    news_count: Option<u32>,

    /// Alignment window in seconds
    #[arg(short, long)]
    window: Option<i64>,

    /// Output directory
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Price column (open or close)
    #[arg(long)]
    price_field: Option<PriceField>,

    /// Do not save raw snapshots during `run`
    #[arg(long)]
    no_snapshots: bool,
}

impl Overrides {
    fn apply(self, config: &mut Config) {
        if let Some(symbol) = self.symbol {
            config.asset.symbol = symbol;
        }
        if let Some(period) = self.period {
            config.fetch.period = period;
        }
        if let Some(interval) = self.interval {
            config.fetch.interval = interval;
        }
        if let Some(count) = self.news_count {
            config.fetch.news_count = count;
        }
        if let Some(window) = self.window {
            config.alignment.window_secs = window;
        }
        if let Some(dir) = self.data_dir {
            config.output.data_dir = dir;
        }
        if let Some(field) = self.price_field {
            config.fetch.price_field = field;
        }
        if self.no_snapshots {
            config.output.save_raw_snapshots = false;
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&PathBuf>, overrides: Overrides) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::read_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    overrides.apply(&mut config);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn build_pipeline(config: Config) -> Result<Pipeline<YahooClient, YahooClient>> {
    let client = YahooClient::from_config(&config.fetch).context("creating Yahoo client")?;
    Ok(Pipeline::new(config, client.clone(), client)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Run { overrides } => {
            let config = load_config(cli.config.as_ref(), overrides)?;
            let report = build_pipeline(config)?
                .run()
                .await
                .context("dataset build failed")?;
            tracing::info!(
                records = report.records,
                path = %report.dataset_path.display(),
                "pipeline complete"
            );
        }
        Commands::Fetch { overrides } => {
            let config = load_config(cli.config.as_ref(), overrides)?;
            let paths = build_pipeline(config)?
                .fetch_snapshots()
                .await
                .context("snapshot fetch failed")?;
            tracing::info!(
                samples = paths.samples,
                entries = paths.entries,
                prices = %paths.prices.display(),
                news = %paths.news.display(),
                "snapshots saved"
            );
        }
        Commands::Prepare { overrides } => {
            let config = load_config(cli.config.as_ref(), overrides)?;
            let report =
                prepare_from_snapshots(&config).context("preparing from snapshots failed")?;
            tracing::info!(
                records = report.records,
                path = %report.dataset_path.display(),
                "pipeline complete"
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_overrides_apply() {
        let cli = Cli::parse_from([
            "newsprice",
            "run",
            "--symbol",
            "ETH-USD",
            "--window",
            "60",
            "--price-field",
            "open",
            "--no-snapshots",
        ]);
        let Commands::Run { overrides } = cli.command else {
            panic!("expected run");
        };

        let config = load_config(None, overrides).unwrap();
        assert_eq!(config.asset.symbol, "ETH-USD");
        assert_eq!(config.alignment.window_secs, 60);
        assert_eq!(config.fetch.price_field, PriceField::Open);
        assert!(!config.output.save_raw_snapshots);
        assert_eq!(config.fetch.interval, "1m");
    }

    #[test]
    fn test_override_fixes_invalid_file_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("newsprice.toml");
        std::fs::write(&path, "[alignment]\nwindow_secs = 0\n").unwrap();

        assert!(load_config(Some(&path), Overrides::default()).is_err());

        let overrides = Overrides {
            window: Some(300),
            ..Overrides::default()
        };
        let config = load_config(Some(&path), overrides).unwrap();
        assert_eq!(config.alignment.window_secs, 300);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let overrides = Overrides {
            window: Some(0),
            ..Overrides::default()
        };
        assert!(load_config(None, overrides).is_err());
    }
}
