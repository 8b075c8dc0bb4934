//! Domain types for coinlens.

pub mod metadata;
pub mod metric;
pub mod price;

pub use metadata::CoinMetadata;
pub use metric::MetricRow;
pub use price::{CoinSeries, PricePoint, SeriesError};
