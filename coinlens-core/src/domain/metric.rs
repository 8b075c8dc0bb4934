//! MetricRow — one derived analytics row per (coin, date).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Derived analytics for a single coin on a single date.
///
/// Field order is the column order of the exported price file, which is the
/// contract with the dashboard that reads it. `None` is written as an empty field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub date: NaiveDate,
    pub coin_id: String,
    pub vs_currency: String,
    pub price: f64,
    pub volume: Option<f64>,
    pub market_cap: Option<f64>,
    /// Undefined on the first date of each coin and after a zero price.
    pub daily_return: Option<f64>,
    pub pct_change: Option<f64>,
    pub ma_7: f64,
    pub ma_30: f64,
    pub volatility_30d: Option<f64>,
    pub cum_return: Option<f64>,
    pub rolling_max_price: f64,
    pub drawdown: Option<f64>,
    pub market_share: Option<f64>,
}

impl MetricRow {
    /// The (coin, date) key identifying this row.
    pub fn key(&self) -> (&str, NaiveDate) {
        (&self.coin_id, self.date)
    }
}
