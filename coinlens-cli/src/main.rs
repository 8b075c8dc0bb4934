//! coinlens CLI — one batch run of the CoinGecko ETL.
//!
//! With no arguments, fetches the default coin set and writes
//! `data/crypto_prices.csv` and `data/coin_metadata.csv`. Flags override the
//! defaults or a TOML config file. Set `RUST_LOG` to change verbosity.

use anyhow::{Context, Result};
use clap::Parser;
use coinlens_core::data::LogProgress;
use coinlens_runner::{run_etl, EtlConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "coinlens",
    version,
    about = "Fetch CoinGecko history, derive returns/volatility/market share, write CSV"
)]
struct Cli {
    /// Path to a TOML config file. Flags below take precedence over it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma-separated coin identifiers (e.g. bitcoin,ethereum).
    #[arg(long, value_delimiter = ',', conflicts_with = "top")]
    coins: Option<Vec<String>>,

    /// Fetch the N largest coins by market cap (1-250) instead of a fixed list.
    #[arg(long)]
    top: Option<u32>,

    /// Days of daily history (1-365).
    #[arg(long)]
    days: Option<u32>,

    /// Quote currency.
    #[arg(long)]
    vs_currency: Option<String>,

    /// Directory receiving the two CSV files.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

impl Cli {
    /// Resolve the effective config: file (or defaults), then flag overrides.
    fn into_config(self) -> Result<EtlConfig> {
        let mut config = match &self.config {
            Some(path) => EtlConfig::from_file(path)?,
            None => EtlConfig::default(),
        };

        if let Some(coins) = self.coins {
            config.coins = coins;
            config.top_n = None;
        }
        if let Some(n) = self.top {
            config.top_n = Some(n);
        }
        if let Some(days) = self.days {
            config.days = days;
        }
        if let Some(cur) = self.vs_currency {
            config.vs_currency = cur;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    init_tracing();

    let config = Cli::parse().into_config()?;
    let client = config.client().context("failed to create CoinGecko client")?;

    let summary = run_etl(&client, &config, &LogProgress).context("ETL run failed")?;

    tracing::info!(
        coins = summary.coins.len(),
        skipped = summary.skipped.len(),
        rows = summary.rows,
        prices = %summary.prices_path.display(),
        metadata = %summary.metadata_path.display(),
        "run complete"
    );
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("coinlens=info,coinlens_core=info,coinlens_runner=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
