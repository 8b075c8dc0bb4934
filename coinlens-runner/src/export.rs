//! Loader: CSV export of metric rows and coin metadata.
//!
//! Column names and order are the contract with the dashboard reading these
//! files. Undefined values are empty fields; floats use the shortest
//! representation that parses back to the same value.
//!
//! Both files are rendered in memory before either is written, then each
//! target is overwritten in full. There is no atomic swap.

use std::path::{Path, PathBuf};

use coinlens_core::domain::{CoinMetadata, MetricRow};
use thiserror::Error;

/// Header of the price/metric file.
pub const METRIC_COLUMNS: [&str; 15] = [
    "date",
    "coin_id",
    "vs_currency",
    "price",
    "volume",
    "market_cap",
    "daily_return",
    "pct_change",
    "ma_7",
    "ma_30",
    "volatility_30d",
    "cum_return",
    "rolling_max_price",
    "drawdown",
    "market_share",
];

/// Header of the metadata file.
pub const METADATA_COLUMNS: [&str; 4] = ["coin_id", "symbol", "name", "market_cap_rank"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush CSV writer: {0}")]
    Flush(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ─── Rendering ──────────────────────────────────────────────────────

/// Render metric rows as CSV bytes, header included even when empty.
pub fn render_metrics_csv(rows: &[MetricRow]) -> Result<Vec<u8>, ExportError> {
    render(&METRIC_COLUMNS, rows)
}

/// Render coin metadata as CSV bytes, header included even when empty.
pub fn render_metadata_csv(metadata: &[CoinMetadata]) -> Result<Vec<u8>, ExportError> {
    render(&METADATA_COLUMNS, metadata)
}

fn render<T: serde::Serialize>(header: &[&str], records: &[T]) -> Result<Vec<u8>, ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);
    wtr.write_record(header)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.into_inner().map_err(|e| ExportError::Flush(e.to_string()))
}

// ─── Writing ────────────────────────────────────────────────────────

/// Write both output files, creating their directories if needed.
pub fn write_outputs(
    rows: &[MetricRow],
    metadata: &[CoinMetadata],
    prices_path: &Path,
    metadata_path: &Path,
) -> Result<(), ExportError> {
    let prices_csv = render_metrics_csv(rows)?;
    let metadata_csv = render_metadata_csv(metadata)?;

    write_file(prices_path, &prices_csv)?;
    tracing::info!(path = %prices_path.display(), rows = rows.len(), "saved");

    write_file(metadata_path, &metadata_csv)?;
    tracing::info!(path = %metadata_path.display(), rows = metadata.len(), "saved");

    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(io_err)?;
    }
    std::fs::write(path, bytes).map_err(io_err)
}

// ─── Reading ────────────────────────────────────────────────────────

/// Parse a metric file written by [`write_outputs`].
pub fn read_metrics_csv(path: &Path) -> Result<Vec<MetricRow>, ExportError> {
    read(path)
}

/// Parse a metadata file written by [`write_outputs`].
pub fn read_metadata_csv(path: &Path) -> Result<Vec<CoinMetadata>, ExportError> {
    read(path)
}

fn read<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, ExportError> {
    let mut rdr = csv::Reader::from_path(path)?;
    let records = rdr.deserialize().collect::<Result<Vec<T>, _>>()?;
    Ok(records)
}
