//! Static coin reference data.

use serde::{Deserialize, Serialize};

/// Descriptive fields for one coin, exported alongside the price file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinMetadata {
    pub coin_id: String,
    pub symbol: String,
    pub name: String,
    pub market_cap_rank: Option<u32>,
}

impl CoinMetadata {
    /// Metadata derived from the identifier alone, used when the markets
    /// endpoint has no entry for a coin.
    ///
    /// `usd-coin` becomes symbol `USD-` and name `Usd Coin`. Every dash turns
    /// into a space, and a letter is capitalized whenever it follows a
    /// non-letter, so `1inch` is named `1Inch`.
    pub fn fallback(coin_id: &str) -> Self {
        let symbol = coin_id.chars().take(4).collect::<String>().to_uppercase();
        let name = title_case(&coin_id.replace('-', " "));

        Self {
            coin_id: coin_id.to_string(),
            symbol,
            name,
            market_cap_rank: None,
        }
    }
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut after_letter = false;
    for c in text.chars() {
        if after_letter {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        after_letter = c.is_alphabetic();
    }
    out
}
