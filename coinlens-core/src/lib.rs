//! coinlens core — domain types, extraction, and the metric transformer.
//!
//! This crate holds the two stages that do real work:
//! - Extraction from the CoinGecko API into canonical per-coin daily series
//! - Transformation of those series into per-(coin, date) analytics rows
//!
//! Orchestration and CSV output live in `coinlens-runner`.

pub mod data;
pub mod domain;
pub mod transform;

pub use data::{ChartRequest, CoinGeckoClient, DataError, MarketDataSource};
pub use domain::{CoinMetadata, CoinSeries, MetricRow, PricePoint};
pub use transform::{compute_metrics, ComputeError};
