//! PricePoint and CoinSeries — the raw daily observations of one coin.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One daily observation for a single coin.
///
/// `volume` and `market_cap` are optional because the upstream API does not
/// guarantee a value for every price timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub coin_id: String,
    pub date: NaiveDate,
    pub price: f64,
    pub volume: Option<f64>,
    pub market_cap: Option<f64>,
}

/// Structural violations when assembling a series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("duplicate date {date} in series for '{coin_id}'")]
    DuplicateDate { coin_id: String, date: NaiveDate },

    #[error("point for '{found}' found in series for '{expected}'")]
    ForeignPoint { expected: String, found: String },
}

/// Ordered daily observations for one coin.
///
/// Invariant: points are sorted by date ascending and no date appears twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinSeries {
    coin_id: String,
    vs_currency: String,
    points: Vec<PricePoint>,
}

impl CoinSeries {
    /// Build a series, sorting points by date and rejecting duplicates or
    /// points belonging to another coin.
    pub fn new(
        coin_id: impl Into<String>,
        vs_currency: impl Into<String>,
        mut points: Vec<PricePoint>,
    ) -> Result<Self, SeriesError> {
        let coin_id = coin_id.into();

        if let Some(p) = points.iter().find(|p| p.coin_id != coin_id) {
            return Err(SeriesError::ForeignPoint {
                expected: coin_id,
                found: p.coin_id.clone(),
            });
        }

        points.sort_by_key(|p| p.date);
        if let Some(w) = points.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(SeriesError::DuplicateDate {
                coin_id,
                date: w[1].date,
            });
        }

        Ok(Self {
            coin_id,
            vs_currency: vs_currency.into(),
            points,
        })
    }

    pub fn coin_id(&self) -> &str {
        &self.coin_id
    }

    pub fn vs_currency(&self) -> &str {
        &self.vs_currency
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Prices in date order.
    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First and last observed dates, if any.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.points.first()?.date, self.points.last()?.date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(coin: &str, date: &str, price: f64) -> PricePoint {
        PricePoint {
            coin_id: coin.into(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            price,
            volume: None,
            market_cap: None,
        }
    }

    #[test]
    fn series_sorts_by_date() {
        let series = CoinSeries::new(
            "bitcoin",
            "usd",
            vec![
                point("bitcoin", "2024-01-03", 3.0),
                point("bitcoin", "2024-01-01", 1.0),
                point("bitcoin", "2024-01-02", 2.0),
            ],
        )
        .unwrap();

        assert_eq!(series.prices(), vec![1.0, 2.0, 3.0]);
        let (first, last) = series.date_range().unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }

    #[test]
    fn series_rejects_duplicate_dates() {
        let err = CoinSeries::new(
            "bitcoin",
            "usd",
            vec![
                point("bitcoin", "2024-01-01", 1.0),
                point("bitcoin", "2024-01-01", 2.0),
            ],
        )
        .unwrap_err();

        assert!(matches!(err, SeriesError::DuplicateDate { .. }));
    }

    #[test]
    fn series_rejects_foreign_points() {
        let err = CoinSeries::new(
            "bitcoin",
            "usd",
            vec![point("ethereum", "2024-01-01", 1.0)],
        )
        .unwrap_err();

        assert_eq!(
            err,
            SeriesError::ForeignPoint {
                expected: "bitcoin".into(),
                found: "ethereum".into(),
            }
        );
    }

    #[test]
    fn empty_series_has_no_range() {
        let series = CoinSeries::new("bitcoin", "usd", vec![]).unwrap();
        assert!(series.is_empty());
        assert!(series.date_range().is_none());
    }
}
