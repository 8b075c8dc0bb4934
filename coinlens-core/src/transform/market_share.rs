//! Cross-coin market share per date.

use super::rolling::ratio;
use crate::domain::MetricRow;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Fill `market_share` on every row: the coin's market cap divided by the sum
/// of market caps of all coins with a cap on that date.
///
/// A row without a market cap, or on a date whose total is zero, gets `None`.
pub fn apply_market_share(rows: &mut [MetricRow]) {
    let totals = totals_by_date(rows);

    for row in rows.iter_mut() {
        row.market_share = match (usable_cap(row), totals.get(&row.date)) {
            (Some(cap), Some(&total)) => ratio(cap, total),
            _ => None,
        };
    }
}

/// Sum of usable market caps per date.
pub fn totals_by_date(rows: &[MetricRow]) -> HashMap<NaiveDate, f64> {
    let mut totals: HashMap<NaiveDate, f64> = HashMap::new();
    for row in rows {
        if let Some(cap) = usable_cap(row) {
            *totals.entry(row.date).or_insert(0.0) += cap;
        }
    }
    totals
}

fn usable_cap(row: &MetricRow) -> Option<f64> {
    row.market_cap.filter(|c| c.is_finite() && *c >= 0.0)
}
