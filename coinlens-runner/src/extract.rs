//! Extraction stage: coin list resolution, per-coin history, metadata.
//!
//! Fail-fast: the first source error aborts the whole extraction and nothing
//! fetched so far is kept.

use coinlens_core::data::{ChartRequest, DataError, FetchProgress, MarketDataSource};
use coinlens_core::domain::{CoinMetadata, CoinSeries};
use std::collections::{HashMap, HashSet};

use crate::config::EtlConfig;

/// Everything fetched in one run.
#[derive(Debug)]
pub struct Extraction {
    /// Non-empty series, in request order.
    pub series: Vec<CoinSeries>,
    /// One metadata row per fetched coin, in the same order as `series`.
    pub metadata: Vec<CoinMetadata>,
    /// Coins that returned no prices.
    pub skipped: Vec<String>,
}

/// Coins to fetch: the configured top N by market cap, or the configured list.
///
/// Duplicates are dropped, keeping the first occurrence.
pub fn resolve_coins(
    source: &dyn MarketDataSource,
    config: &EtlConfig,
) -> Result<Vec<String>, DataError> {
    let coins = match config.top_n {
        Some(n) => {
            tracing::info!(n, source = source.name(), "resolving top coins by market cap");
            source.top_coins(n, &config.vs_currency)?
        }
        None => config.coins.iter().map(|c| c.trim().to_string()).collect(),
    };

    let mut seen = HashSet::new();
    let coins: Vec<String> = coins.into_iter().filter(|c| seen.insert(c.clone())).collect();

    if coins.is_empty() {
        return Err(DataError::NoData { coins });
    }
    Ok(coins)
}

/// Fetch the history of every coin, then metadata for the coins that had data.
pub fn extract(
    source: &dyn MarketDataSource,
    coins: &[String],
    request: &ChartRequest,
    progress: &dyn FetchProgress,
) -> Result<Extraction, DataError> {
    let total = coins.len();
    let mut series = Vec::with_capacity(total);
    let mut skipped = Vec::new();

    for (i, coin) in coins.iter().enumerate() {
        progress.on_start(coin, i, total);
        let s = source.market_chart(coin, request)?;
        progress.on_complete(coin, i, total, s.len());

        if s.is_empty() {
            skipped.push(coin.clone());
        } else {
            series.push(s);
        }
    }
    progress.on_batch_complete(series.len(), skipped.len(), total);

    if series.is_empty() {
        return Err(DataError::NoData {
            coins: coins.to_vec(),
        });
    }

    let fetched: Vec<String> = series.iter().map(|s| s.coin_id().to_string()).collect();
    let fetched_meta = source.coin_metadata(&fetched, &request.vs_currency)?;
    let metadata = order_metadata(&fetched, fetched_meta);

    Ok(Extraction {
        series,
        metadata,
        skipped,
    })
}

/// Align metadata to `coins`, substituting derived rows for coins the source
/// did not describe and dropping rows for coins that were not requested.
fn order_metadata(coins: &[String], fetched: Vec<CoinMetadata>) -> Vec<CoinMetadata> {
    let mut by_id: HashMap<String, CoinMetadata> = fetched
        .into_iter()
        .map(|m| (m.coin_id.clone(), m))
        .collect();

    coins
        .iter()
        .map(|id| {
            by_id.remove(id).unwrap_or_else(|| {
                tracing::warn!(coin = id.as_str(), "no metadata from source, using derived name");
                CoinMetadata::fallback(id)
            })
        })
        .collect()
}
