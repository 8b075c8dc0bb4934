//! CoinGecko public API source.
//!
//! Endpoints used:
//! - `/coins/{id}/market_chart` — daily price, market cap and volume history
//! - `/coins/markets` — name, symbol and rank; also the top-N listing
//!
//! Requests are blocking and never retried. A fixed pause is inserted between
//! consecutive requests to stay under the public tier's rate limit.

use super::canonicalize::{canonicalize, RawSample};
use super::provider::{ChartRequest, DataError, MarketDataSource};
use crate::domain::{CoinMetadata, CoinSeries};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::cell::Cell;
use std::time::{Duration, Instant};

/// Public v3 API root.
pub const COINGECKO_API_BASE: &str = "https://api.coingecko.com/api/v3";

/// Largest `per_page` the markets endpoint honors.
pub const MARKETS_PAGE_LIMIT: usize = 250;

/// `/coins/{id}/market_chart` response body.
#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    prices: Vec<RawSample>,
    #[serde(default)]
    market_caps: Vec<RawSample>,
    #[serde(default)]
    total_volumes: Vec<RawSample>,
}

/// One element of the `/coins/markets` response array.
#[derive(Debug, Deserialize)]
struct MarketEntry {
    id: String,
    symbol: Option<String>,
    name: Option<String>,
    market_cap_rank: Option<u32>,
}

impl From<MarketEntry> for CoinMetadata {
    fn from(entry: MarketEntry) -> Self {
        let fallback = CoinMetadata::fallback(&entry.id);
        CoinMetadata {
            symbol: entry.symbol.unwrap_or(fallback.symbol),
            name: entry.name.unwrap_or(fallback.name),
            market_cap_rank: entry.market_cap_rank,
            coin_id: entry.id,
        }
    }
}

/// Blocking CoinGecko client.
pub struct CoinGeckoClient {
    client: reqwest::blocking::Client,
    base_url: String,
    request_pause: Duration,
    last_request: Cell<Option<Instant>>,
}

impl CoinGeckoClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        request_pause: Duration,
    ) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("coinlens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DataError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_pause,
            last_request: Cell::new(None),
        })
    }

    /// GET /coins/{id}/market_chart?vs_currency={cur}&days={days}&interval=daily
    pub fn market_chart_url(&self, coin_id: &str, request: &ChartRequest) -> String {
        format!(
            "{}/coins/{coin_id}/market_chart?vs_currency={}&days={}&interval=daily",
            self.base_url, request.vs_currency, request.days
        )
    }

    /// GET /coins/markets?vs_currency={cur}&ids={a,b,...}&per_page={len}
    ///
    /// The endpoint pages at 100 entries unless told otherwise, so `per_page`
    /// always matches the id count. Callers keep batches within
    /// [`MARKETS_PAGE_LIMIT`].
    pub fn markets_url(&self, coin_ids: &[String], vs_currency: &str) -> String {
        format!(
            "{}/coins/markets?vs_currency={vs_currency}&ids={}&per_page={}",
            self.base_url,
            coin_ids.join(","),
            coin_ids.len()
        )
    }

    /// GET /coins/markets?vs_currency={cur}&order=market_cap_desc&per_page={n}&page=1
    ///
    /// Only the first page is requested, so `n` must not exceed
    /// [`MARKETS_PAGE_LIMIT`].
    pub fn top_markets_url(&self, n: u32, vs_currency: &str) -> String {
        format!(
            "{}/coins/markets?vs_currency={vs_currency}&order=market_cap_desc&per_page={n}&page=1",
            self.base_url
        )
    }

    /// Sleep until `request_pause` has elapsed since the previous request.
    fn throttle(&self) {
        if let Some(last) = self.last_request.get() {
            let elapsed = last.elapsed();
            if elapsed < self.request_pause {
                std::thread::sleep(self.request_pause - elapsed);
            }
        }
        self.last_request.set(Some(Instant::now()));
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, DataError> {
        self.throttle();
        tracing::debug!(url, "GET");

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| DataError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = resp
            .text()
            .map_err(|e| DataError::Transport(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| DataError::Parse(format!("{url}: {e}")))
    }
}

/// Parse a market-chart body into a canonical series.
pub fn parse_market_chart(
    json: &str,
    coin_id: &str,
    vs_currency: &str,
) -> Result<CoinSeries, DataError> {
    let chart: MarketChartResponse =
        serde_json::from_str(json).map_err(|e| DataError::Parse(e.to_string()))?;
    chart_to_series(chart, coin_id, vs_currency)
}

/// Parse a `/coins/markets` body into metadata rows, in response order.
pub fn parse_markets(json: &str) -> Result<Vec<CoinMetadata>, DataError> {
    let entries: Vec<MarketEntry> =
        serde_json::from_str(json).map_err(|e| DataError::Parse(e.to_string()))?;
    Ok(entries.into_iter().map(CoinMetadata::from).collect())
}

fn chart_to_series(
    chart: MarketChartResponse,
    coin_id: &str,
    vs_currency: &str,
) -> Result<CoinSeries, DataError> {
    canonicalize(
        coin_id,
        vs_currency,
        &chart.prices,
        &chart.market_caps,
        &chart.total_volumes,
    )
}

impl MarketDataSource for CoinGeckoClient {
    fn name(&self) -> &str {
        "coingecko"
    }

    fn market_chart(
        &self,
        coin_id: &str,
        request: &ChartRequest,
    ) -> Result<CoinSeries, DataError> {
        let url = self.market_chart_url(coin_id, request);
        let chart: MarketChartResponse = self.get_json(&url)?;
        chart_to_series(chart, coin_id, &request.vs_currency)
    }

    fn coin_metadata(
        &self,
        coin_ids: &[String],
        vs_currency: &str,
    ) -> Result<Vec<CoinMetadata>, DataError> {
        let mut metadata = Vec::with_capacity(coin_ids.len());
        for batch in coin_ids.chunks(MARKETS_PAGE_LIMIT) {
            let url = self.markets_url(batch, vs_currency);
            let entries: Vec<MarketEntry> = self.get_json(&url)?;
            metadata.extend(entries.into_iter().map(CoinMetadata::from));
        }
        Ok(metadata)
    }

    fn top_coins(&self, n: u32, vs_currency: &str) -> Result<Vec<String>, DataError> {
        let url = self.top_markets_url(n, vs_currency);
        let entries: Vec<MarketEntry> = self.get_json(&url)?;
        Ok(entries.into_iter().map(|e| e.id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    fn client() -> CoinGeckoClient {
        client_at("https://api.example.test/v3/")
    }

    fn client_at(base_url: &str) -> CoinGeckoClient {
        CoinGeckoClient::new(base_url, Duration::from_secs(5), Duration::ZERO).unwrap()
    }

    /// Serve one canned response per entry of `responses` on a loopback
    /// port. The handle yields the request lines received.
    fn serve(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = std::thread::spawn(move || {
            let mut requests = Vec::new();
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                let mut header = String::new();
                while reader.read_line(&mut header).unwrap() > 2 {
                    header.clear();
                }
                requests.push(request_line.trim_end().to_string());

                write!(
                    stream,
                    "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                )
                .unwrap();
            }
            requests
        });

        (base_url, handle)
    }

    fn request() -> ChartRequest {
        ChartRequest {
            vs_currency: "usd".into(),
            days: 365,
        }
    }

    #[test]
    fn market_chart_url() {
        let url = client().market_chart_url("bitcoin", &request());
        assert_eq!(
            url,
            "https://api.example.test/v3/coins/bitcoin/market_chart?vs_currency=usd&days=365&interval=daily"
        );
    }

    #[test]
    fn markets_url_joins_ids() {
        let ids = vec!["bitcoin".to_string(), "ethereum".to_string()];
        let url = client().markets_url(&ids, "eur");
        assert!(url.ends_with("/coins/markets?vs_currency=eur&ids=bitcoin,ethereum&per_page=2"));
    }

    #[test]
    fn markets_url_sizes_page_to_id_count() {
        let ids: Vec<String> = (0..150).map(|i| format!("coin-{i}")).collect();
        let url = client().markets_url(&ids, "usd");
        assert!(url.ends_with("&per_page=150"));
    }

    #[test]
    fn top_markets_url() {
        let url = client().top_markets_url(5, "usd");
        assert!(url.contains("order=market_cap_desc"));
        assert!(url.contains("per_page=5"));
    }

    #[test]
    fn parse_market_chart_full() {
        let json = r#"{
            "prices": [[1704067200000, 42000.5], [1704153600000, 43500.75]],
            "total_volumes": [[1704067200000, 25000000000], [1704153600000, 28000000000]],
            "market_caps": [[1704067200000, 820000000000], [1704153600000, 850000000000]]
        }"#;

        let series = parse_market_chart(json, "bitcoin", "usd").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0].price, 42000.5);
        assert_eq!(series.points()[1].market_cap, Some(850_000_000_000.0));
        assert_eq!(series.points()[1].volume, Some(28_000_000_000.0));
    }

    #[test]
    fn parse_market_chart_without_caps() {
        let json = r#"{"prices": [[1704067200000, 1.0]]}"#;
        let series = parse_market_chart(json, "tether", "usd").unwrap();
        assert_eq!(series.points()[0].market_cap, None);
    }

    #[test]
    fn parse_market_chart_tolerates_null_values() {
        let json = r#"{"prices": [[1704067200000, null], [1704153600000, 2.0]]}"#;
        let series = parse_market_chart(json, "tether", "usd").unwrap();
        assert_eq!(series.prices(), vec![2.0]);
    }

    #[test]
    fn missing_prices_is_a_parse_error() {
        let json = r#"{"market_caps": []}"#;
        let err = parse_market_chart(json, "bitcoin", "usd").unwrap_err();
        assert!(matches!(err, DataError::Parse(_)));
    }

    #[test]
    fn error_body_is_a_parse_error() {
        let json = r#"{"status": {"error_code": 429, "error_message": "rate limited"}}"#;
        assert!(matches!(
            parse_market_chart(json, "bitcoin", "usd"),
            Err(DataError::Parse(_))
        ));
    }

    #[test]
    fn parse_markets_maps_fields() {
        let json = r#"[
            {"id": "bitcoin", "symbol": "btc", "name": "Bitcoin", "market_cap_rank": 1, "current_price": 42000},
            {"id": "mystery-coin", "symbol": null, "name": null, "market_cap_rank": null}
        ]"#;

        let meta = parse_markets(json).unwrap();
        assert_eq!(meta.len(), 2);
        assert_eq!(meta[0].symbol, "btc");
        assert_eq!(meta[0].name, "Bitcoin");
        assert_eq!(meta[0].market_cap_rank, Some(1));
        assert_eq!(meta[1].symbol, "MYST");
        assert_eq!(meta[1].name, "Mystery Coin");
        assert_eq!(meta[1].market_cap_rank, None);
    }

    #[test]
    fn metadata_is_fetched_in_page_sized_batches() {
        let (base_url, server) = serve(vec![(200, "[]"), (200, "[]")]);
        let ids: Vec<String> = (0..300).map(|i| format!("coin-{i}")).collect();

        let meta = client_at(&base_url).coin_metadata(&ids, "usd").unwrap();

        assert!(meta.is_empty());
        let requests = server.join().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].contains("per_page=250"));
        assert!(requests[0].contains("ids=coin-0,"));
        assert!(requests[1].contains("per_page=50"));
        assert!(requests[1].contains("ids=coin-250,"));
    }

    #[test]
    fn non_success_status_is_http_status() {
        let (base_url, server) = serve(vec![(429, r#"{"status":{"error_code":429}}"#)]);

        let err = client_at(&base_url)
            .market_chart("bitcoin", &request())
            .unwrap_err();

        assert!(matches!(err, DataError::HttpStatus { status: 429, .. }));
        let requests = server.join().unwrap();
        assert!(requests[0].starts_with("GET /coins/bitcoin/market_chart?"));
    }

    #[test]
    fn success_status_is_parsed() {
        let (base_url, server) = serve(vec![(200, r#"{"prices": [[1704067200000, 42000.5]]}"#)]);

        let series = client_at(&base_url)
            .market_chart("bitcoin", &request())
            .unwrap();

        assert_eq!(series.prices(), vec![42000.5]);
        server.join().unwrap();
    }

    #[test]
    fn refused_connection_is_transport_error() {
        let err = client_at("http://127.0.0.1:1")
            .market_chart("bitcoin", &request())
            .unwrap_err();
        assert!(matches!(err, DataError::Transport(_)));
    }

    #[test]
    fn empty_metadata_request_makes_no_call() {
        // The base URL is unroutable; an actual request would fail.
        let meta = client().coin_metadata(&[], "usd").unwrap();
        assert!(meta.is_empty());
    }
}
