//! Serializable batch configuration.
//!
//! Every field has a default, so an empty TOML file (or no file at all)
//! reproduces the standard run: five large-cap coins, 365 days, USD, `./data`.

use coinlens_core::data::{
    ChartRequest, CoinGeckoClient, DataError, COINGECKO_API_BASE, MARKETS_PAGE_LIMIT,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Coins fetched when neither `coins` nor `top_n` is configured.
pub const DEFAULT_COINS: [&str; 5] = ["bitcoin", "ethereum", "tether", "binancecoin", "solana"];

/// Longest window the public API tier serves at daily granularity.
pub const MAX_DAYS: u32 = 365;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Configuration for one ETL run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EtlConfig {
    /// CoinGecko coin identifiers, fetched in this order.
    pub coins: Vec<String>,
    /// When set, fetch the top N coins by market cap instead of `coins`.
    pub top_n: Option<u32>,
    /// Quote currency, e.g. `usd`.
    pub vs_currency: String,
    /// Trailing days of daily history.
    pub days: u32,
    /// Directory receiving both output files.
    pub output_dir: PathBuf,
    pub prices_file: String,
    pub metadata_file: String,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Pause between consecutive API requests.
    pub request_pause_ms: u64,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            coins: DEFAULT_COINS.iter().map(|c| c.to_string()).collect(),
            top_n: None,
            vs_currency: "usd".into(),
            days: MAX_DAYS,
            output_dir: PathBuf::from("data"),
            prices_file: "crypto_prices.csv".into(),
            metadata_file: "coin_metadata.csv".into(),
            base_url: COINGECKO_API_BASE.into(),
            timeout_secs: 30,
            request_pause_ms: 1100,
        }
    }
}

impl EtlConfig {
    /// Parse a config from a TOML string. Missing keys take their defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Reject configurations the upstream API cannot serve.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.top_n {
            Some(0) => return Err(ConfigError::Invalid("top_n must be at least 1".into())),
            Some(n) if n as usize > MARKETS_PAGE_LIMIT => {
                return Err(ConfigError::Invalid(format!(
                    "top_n must be at most {MARKETS_PAGE_LIMIT}, got {n}"
                )))
            }
            Some(_) => {}
            None => {
                if self.coins.is_empty() {
                    return Err(ConfigError::Invalid("no coins configured".into()));
                }
                if self.coins.iter().any(|c| c.trim().is_empty()) {
                    return Err(ConfigError::Invalid("blank coin identifier".into()));
                }
            }
        }
        if !(1..=MAX_DAYS).contains(&self.days) {
            return Err(ConfigError::Invalid(format!(
                "days must be between 1 and {MAX_DAYS}, got {}",
                self.days
            )));
        }
        if self.vs_currency.trim().is_empty() {
            return Err(ConfigError::Invalid("vs_currency is empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".into()));
        }
        if self.prices_file == self.metadata_file {
            return Err(ConfigError::Invalid(
                "prices_file and metadata_file must differ".into(),
            ));
        }
        Ok(())
    }

    pub fn prices_path(&self) -> PathBuf {
        self.output_dir.join(&self.prices_file)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.output_dir.join(&self.metadata_file)
    }

    pub fn chart_request(&self) -> ChartRequest {
        ChartRequest {
            vs_currency: self.vs_currency.clone(),
            days: self.days,
        }
    }

    /// Build the CoinGecko client this config describes.
    pub fn client(&self) -> Result<CoinGeckoClient, DataError> {
        CoinGeckoClient::new(
            self.base_url.as_str(),
            Duration::from_secs(self.timeout_secs),
            Duration::from_millis(self.request_pause_ms),
        )
    }
}
