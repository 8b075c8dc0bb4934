//! Transformer: CoinSeries in, MetricRows out.
//!
//! Every coin is processed on its own dates only (no union of calendars);
//! the one cross-coin column, `market_share`, is filled in a second pass
//! grouped by date.
//!
//! Windowing: moving averages use the points available when fewer than the
//! window exist. Volatility needs at least two defined returns in its window.

pub mod market_share;
pub mod rolling;

use crate::domain::{CoinSeries, MetricRow};
use std::collections::HashSet;
use thiserror::Error;

pub use market_share::apply_market_share;

/// Short moving-average window (`ma_7`).
pub const MA_SHORT_WINDOW: usize = 7;
/// Long moving-average window (`ma_30`).
pub const MA_LONG_WINDOW: usize = 30;
/// Trailing window for `volatility_30d`.
pub const VOLATILITY_WINDOW: usize = 30;
/// Defined returns required before volatility is reported.
pub const VOLATILITY_MIN_RETURNS: usize = 2;

/// Structural problems in the transformer's input.
///
/// Not expected in a normal run: the extractor produces one series per coin.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("coin '{coin_id}' appears in more than one series")]
    DuplicateCoin { coin_id: String },
}

/// Compute every metric column for every (coin, date).
///
/// Rows come out grouped by coin in input order, dates ascending.
pub fn compute_metrics(series: &[CoinSeries]) -> Result<Vec<MetricRow>, ComputeError> {
    let mut seen = HashSet::new();
    for s in series {
        if !seen.insert(s.coin_id()) {
            return Err(ComputeError::DuplicateCoin {
                coin_id: s.coin_id().to_string(),
            });
        }
    }

    let mut rows: Vec<MetricRow> = series.iter().flat_map(coin_metrics).collect();
    apply_market_share(&mut rows);

    tracing::debug!(coins = series.len(), rows = rows.len(), "metrics computed");
    Ok(rows)
}

/// Per-coin metrics; `market_share` is left undefined.
pub fn coin_metrics(series: &CoinSeries) -> Vec<MetricRow> {
    let prices = series.prices();

    let returns = rolling::daily_returns(&prices);
    let ma_short = rolling::trailing_mean(&prices, MA_SHORT_WINDOW);
    let ma_long = rolling::trailing_mean(&prices, MA_LONG_WINDOW);
    let volatility = rolling::trailing_std(&returns, VOLATILITY_WINDOW, VOLATILITY_MIN_RETURNS);
    let cumulative = rolling::cumulative_returns(&prices);
    let peaks = rolling::running_max(&prices);
    let drawdowns = rolling::drawdowns(&prices);

    series
        .points()
        .iter()
        .enumerate()
        .map(|(i, p)| MetricRow {
            date: p.date,
            coin_id: p.coin_id.clone(),
            vs_currency: series.vs_currency().to_string(),
            price: p.price,
            volume: p.volume,
            market_cap: p.market_cap,
            daily_return: returns[i],
            pct_change: returns[i].map(|r| r * 100.0),
            ma_7: ma_short[i],
            ma_30: ma_long[i],
            volatility_30d: volatility[i],
            cum_return: cumulative[i],
            rolling_max_price: peaks[i],
            drawdown: drawdowns[i],
            market_share: None,
        })
        .collect()
}

/// Build a series from close prices for testing: consecutive days from
/// 2024-01-01, market cap = price * 1000.
#[cfg(test)]
pub fn make_series(coin_id: &str, prices: &[f64]) -> CoinSeries {
    use crate::domain::PricePoint;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let points = prices
        .iter()
        .enumerate()
        .map(|(i, &price)| PricePoint {
            coin_id: coin_id.to_string(),
            date: base_date + chrono::Duration::days(i as i64),
            price,
            volume: Some(1_000.0),
            market_cap: Some(price * 1_000.0),
        })
        .collect();
    CoinSeries::new(coin_id, "usd", points).unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for metric tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
