//! Turns raw `[timestamp_ms, value]` arrays into a canonical daily CoinSeries.
//!
//! - timestamps are UTC milliseconds and collapse to calendar dates
//! - points are sorted by timestamp; the first observation of a date wins
//! - null, non-finite, and negative prices are dropped
//! - market caps and volumes are joined to prices by exact timestamp

use super::provider::DataError;
use crate::domain::{CoinSeries, PricePoint};
use chrono::{DateTime, NaiveDate};
use std::collections::HashMap;

/// One `[timestamp_ms, value]` pair as returned by the market-chart endpoint.
pub type RawSample = (f64, Option<f64>);

/// Build a canonical series from the three market-chart arrays.
pub fn canonicalize(
    coin_id: &str,
    vs_currency: &str,
    prices: &[RawSample],
    market_caps: &[RawSample],
    volumes: &[RawSample],
) -> Result<CoinSeries, DataError> {
    let caps = by_timestamp(market_caps);
    let vols = by_timestamp(volumes);

    let mut samples: Vec<(i64, f64)> = prices
        .iter()
        .filter_map(|&(ts, price)| match price {
            Some(p) if p.is_finite() && p >= 0.0 => Some((ts as i64, p)),
            _ => None,
        })
        .collect();
    samples.sort_by_key(|&(ts, _)| ts);

    let mut points: Vec<PricePoint> = Vec::with_capacity(samples.len());
    for (ts, price) in samples {
        let date = to_date(ts)?;
        if points.last().is_some_and(|p| p.date == date) {
            continue;
        }
        points.push(PricePoint {
            coin_id: coin_id.to_string(),
            date,
            price,
            volume: vols.get(&ts).copied(),
            market_cap: caps.get(&ts).copied(),
        });
    }

    CoinSeries::new(coin_id, vs_currency, points).map_err(|e| DataError::Parse(e.to_string()))
}

fn by_timestamp(samples: &[RawSample]) -> HashMap<i64, f64> {
    samples
        .iter()
        .filter_map(|&(ts, v)| v.filter(|v| v.is_finite()).map(|v| (ts as i64, v)))
        .collect()
}

fn to_date(ts_ms: i64) -> Result<NaiveDate, DataError> {
    DateTime::from_timestamp_millis(ts_ms)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| DataError::Parse(format!("invalid timestamp: {ts_ms}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-01-01T00:00:00Z
    const DAY0: f64 = 1_704_067_200_000.0;
    const DAY_MS: f64 = 86_400_000.0;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn joins_caps_and_volumes_by_timestamp() {
        let prices = [(DAY0, Some(100.0)), (DAY0 + DAY_MS, Some(110.0))];
        let caps = [(DAY0, Some(1_000.0)), (DAY0 + DAY_MS, Some(1_100.0))];
        let vols = [(DAY0 + DAY_MS, Some(50.0))];

        let series = canonicalize("bitcoin", "usd", &prices, &caps, &vols).unwrap();
        let pts = series.points();

        assert_eq!(pts.len(), 2);
        assert_eq!(pts[0].date, date("2024-01-01"));
        assert_eq!(pts[0].market_cap, Some(1_000.0));
        assert_eq!(pts[0].volume, None);
        assert_eq!(pts[1].volume, Some(50.0));
    }

    #[test]
    fn first_observation_of_a_date_wins() {
        // Daily series plus an intraday "now" sample on the last day.
        let prices = [
            (DAY0 + DAY_MS + 3_600_000.0, Some(111.0)),
            (DAY0, Some(100.0)),
            (DAY0 + DAY_MS, Some(110.0)),
        ];

        let series = canonicalize("bitcoin", "usd", &prices, &[], &[]).unwrap();
        assert_eq!(series.prices(), vec![100.0, 110.0]);
    }

    #[test]
    fn drops_null_and_negative_prices() {
        let prices = [
            (DAY0, None),
            (DAY0 + DAY_MS, Some(-1.0)),
            (DAY0 + 2.0 * DAY_MS, Some(f64::NAN)),
            (DAY0 + 3.0 * DAY_MS, Some(5.0)),
        ];

        let series = canonicalize("bitcoin", "usd", &prices, &[], &[]).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.points()[0].date, date("2024-01-04"));
    }

    #[test]
    fn out_of_range_timestamp_is_a_parse_error() {
        let prices = [(1e20, Some(1.0))];
        let err = canonicalize("bitcoin", "usd", &prices, &[], &[]).unwrap_err();
        assert!(matches!(err, DataError::Parse(_)));
    }

    #[test]
    fn empty_prices_give_empty_series() {
        let series = canonicalize("bitcoin", "usd", &[], &[], &[]).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.coin_id(), "bitcoin");
        assert_eq!(series.vs_currency(), "usd");
    }
}
