//! coinlens runner — batch orchestration on top of `coinlens-core`.
//!
//! - TOML configuration with defaults for the standard run
//! - Extraction with fail-fast semantics and metadata fallback
//! - CSV export of metrics and metadata
//! - The end-to-end `run_etl` pipeline

pub mod config;
pub mod export;
pub mod extract;
pub mod pipeline;

pub use config::{ConfigError, EtlConfig, DEFAULT_COINS, MAX_DAYS};
pub use export::{
    read_metadata_csv, read_metrics_csv, write_outputs, ExportError, METADATA_COLUMNS,
    METRIC_COLUMNS,
};
pub use extract::{extract, resolve_coins, Extraction};
pub use pipeline::{run_etl, PipelineError, RunSummary};
