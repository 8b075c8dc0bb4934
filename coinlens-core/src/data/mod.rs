//! Extraction: market data sources and canonicalization of raw API payloads.

pub mod canonicalize;
pub mod coingecko;
pub mod provider;

pub use canonicalize::canonicalize;
pub use coingecko::{
    parse_market_chart, parse_markets, CoinGeckoClient, COINGECKO_API_BASE,
    MARKETS_PAGE_LIMIT,
};
pub use provider::{
    ChartRequest, DataError, FetchProgress, LogProgress, MarketDataSource, NoProgress,
};
