//! Market data source trait and structured error types.
//!
//! The MarketDataSource trait abstracts over where price history comes from
//! (the CoinGecko HTTP API in production, in-memory fixtures in tests).

use crate::domain::{CoinMetadata, CoinSeries};
use thiserror::Error;

/// Structured error types for extraction.
///
/// Every variant aborts the run; nothing here is retried.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("unexpected response shape: {0}")]
    Parse(String),

    #[error("no price data returned for any of: {}", .coins.join(", "))]
    NoData { coins: Vec<String> },
}

/// Parameters of a historical market-chart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub vs_currency: String,
    /// Number of trailing days, at daily granularity.
    pub days: u32,
}

/// Trait for market data sources.
pub trait MarketDataSource {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch the daily history of one coin.
    ///
    /// An empty series is a valid answer (the coin exists but has no prices
    /// in the window); the caller decides what to do with it.
    fn market_chart(&self, coin_id: &str, request: &ChartRequest)
        -> Result<CoinSeries, DataError>;

    /// Fetch descriptive metadata for a set of coins.
    ///
    /// Coins unknown to the source are simply absent from the result.
    fn coin_metadata(
        &self,
        coin_ids: &[String],
        vs_currency: &str,
    ) -> Result<Vec<CoinMetadata>, DataError>;

    /// Identifiers of the `n` largest coins by market capitalization.
    fn top_coins(&self, n: u32, vs_currency: &str) -> Result<Vec<String>, DataError>;
}

/// Progress callback for multi-coin extraction.
pub trait FetchProgress {
    /// Called when starting to fetch a coin.
    fn on_start(&self, coin_id: &str, index: usize, total: usize);

    /// Called when a coin fetch completes. `points` is 0 for a skipped coin.
    fn on_complete(&self, coin_id: &str, index: usize, total: usize, points: usize);

    /// Called when every coin has been fetched.
    fn on_batch_complete(&self, fetched: usize, skipped: usize, total: usize);
}

/// Progress reporter that emits `tracing` events.
pub struct LogProgress;

impl FetchProgress for LogProgress {
    fn on_start(&self, coin_id: &str, index: usize, total: usize) {
        tracing::info!(coin = coin_id, "[{}/{}] fetching", index + 1, total);
    }

    fn on_complete(&self, coin_id: &str, _index: usize, _total: usize, points: usize) {
        if points == 0 {
            tracing::warn!(coin = coin_id, "no price data, skipping");
        } else {
            tracing::debug!(coin = coin_id, points, "fetched");
        }
    }

    fn on_batch_complete(&self, fetched: usize, skipped: usize, total: usize) {
        tracing::info!(fetched, skipped, total, "extraction complete");
    }
}

/// Progress reporter that does nothing.
pub struct NoProgress;

impl FetchProgress for NoProgress {
    fn on_start(&self, _coin_id: &str, _index: usize, _total: usize) {}
    fn on_complete(&self, _coin_id: &str, _index: usize, _total: usize, _points: usize) {}
    fn on_batch_complete(&self, _fetched: usize, _skipped: usize, _total: usize) {}
}
