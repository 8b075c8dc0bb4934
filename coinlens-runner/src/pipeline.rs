//! The batch run: extract → transform → load.
//!
//! Every network call completes before the first byte is written, so a failed
//! extraction leaves existing output files untouched.

use std::path::PathBuf;

use coinlens_core::data::{DataError, FetchProgress, MarketDataSource};
use coinlens_core::transform::{compute_metrics, ComputeError};
use thiserror::Error;

use crate::config::{ConfigError, EtlConfig};
use crate::export::{write_outputs, ExportError};
use crate::extract::{extract, resolve_coins};

/// Any failure of a run. All of them abort; none is retried.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("extraction failed: {0}")]
    Data(#[from] DataError),

    #[error("computation failed: {0}")]
    Compute(#[from] ComputeError),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Coins with data, in output order.
    pub coins: Vec<String>,
    /// Coins that returned no prices.
    pub skipped: Vec<String>,
    pub rows: usize,
    pub prices_path: PathBuf,
    pub metadata_path: PathBuf,
}

/// Run the whole batch against `source`.
pub fn run_etl(
    source: &dyn MarketDataSource,
    config: &EtlConfig,
    progress: &dyn FetchProgress,
) -> Result<RunSummary, PipelineError> {
    config.validate()?;

    let coins = resolve_coins(source, config)?;
    tracing::info!(
        coins = ?coins,
        days = config.days,
        vs_currency = config.vs_currency.as_str(),
        "starting run"
    );

    let extraction = extract(source, &coins, &config.chart_request(), progress)?;
    let rows = compute_metrics(&extraction.series)?;

    let prices_path = config.prices_path();
    let metadata_path = config.metadata_path();
    write_outputs(&rows, &extraction.metadata, &prices_path, &metadata_path)?;

    Ok(RunSummary {
        coins: extraction
            .series
            .iter()
            .map(|s| s.coin_id().to_string())
            .collect(),
        skipped: extraction.skipped,
        rows: rows.len(),
        prices_path,
        metadata_path,
    })
}
