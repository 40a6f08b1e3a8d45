use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::quote::{MarketQuote, QuoteMap};
use crate::models::sample::Sample;
use crate::models::settings::DashboardSettings;
use super::traits::{ChartSource, QuoteResolver};

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

const PROVIDER: &str = "CoinGecko";
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// CoinGecko API client backing every tier of the quote chain.
///
/// - **Free**: works without an API key; a demo key raises rate limits.
/// - **Endpoints**: `/coins/markets` (rich), `/simple/price` (simple),
///   `/coins/{id}/market_chart` (history).
///
/// CoinGecko addresses coins by lowercase ids ("bitcoin", "tether"). Common
/// tickers are pre-mapped; unknown ones are tried as their lowercase symbol.
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    /// Uppercase symbol (BTC) → CoinGecko id (bitcoin).
    symbol_map: Mutex<HashMap<String, String>>,
}

impl CoinGeckoProvider {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let settings = DashboardSettings {
            api_base_url: base_url.into(),
            ..DashboardSettings::default()
        };
        Self::from_settings(&settings)
    }

    pub fn from_settings(settings: &DashboardSettings) -> Self {
        let mut symbol_map = HashMap::new();
        let common = [
            ("BTC", "bitcoin"),
            ("ETH", "ethereum"),
            ("USDT", "tether"),
            ("USDC", "usd-coin"),
            ("BNB", "binancecoin"),
            ("XRP", "ripple"),
            ("ADA", "cardano"),
            ("SOL", "solana"),
            ("DOGE", "dogecoin"),
            ("DOT", "polkadot"),
            ("LTC", "litecoin"),
            ("AVAX", "avalanche-2"),
            ("LINK", "chainlink"),
            ("TRX", "tron"),
            ("DAI", "dai"),
            ("PAXG", "pax-gold"),
            ("XAUT", "tether-gold"),
        ];
        for (sym, id) in common {
            symbol_map.insert(sym.to_string(), id.to_string());
        }

        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(settings.request_timeout_secs));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            symbol_map: Mutex::new(symbol_map),
        }
    }

    /// Resolve a symbol like "BTC" to a CoinGecko id like "bitcoin".
    pub fn resolve_id(&self, symbol: &str) -> String {
        let upper = symbol.to_uppercase();
        let map = self.symbol_map.lock().unwrap_or_else(|e| e.into_inner());
        map.get(&upper)
            .cloned()
            .unwrap_or_else(|| symbol.to_lowercase())
    }

    /// Teach the provider a symbol → id mapping it does not know yet.
    pub fn register_id(&self, symbol: &str, id: &str) {
        let mut map = self.symbol_map.lock().unwrap_or_else(|e| e.into_inner());
        map.insert(symbol.to_uppercase(), id.to_string());
    }

    /// Map each requested id back to the symbol it was requested for.
    fn id_lookup(&self, symbols: &BTreeSet<String>) -> BTreeMap<String, String> {
        symbols
            .iter()
            .map(|s| (self.resolve_id(s), s.to_uppercase()))
            .collect()
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let req = self.client.get(format!("{}{path}", self.base_url));
        match &self.api_key {
            Some(key) => req.header(API_KEY_HEADER, key),
            None => req,
        }
    }

    async fn fetch_text(&self, req: RequestBuilder) -> Result<String, CoreError> {
        let body = req.send().await?.error_for_status()?.text().await?;
        Ok(body)
    }

    // ── Endpoint calls ──────────────────────────────────────────────

    /// Rich tier: price plus 24h/7d/30d changes for the whole batch.
    pub async fn fetch_markets(
        &self,
        symbols: &BTreeSet<String>,
        currency: &str,
    ) -> Result<QuoteMap, CoreError> {
        if symbols.is_empty() {
            return Ok(QuoteMap::new());
        }
        let ids = self.id_lookup(symbols);
        let id_list = ids.keys().cloned().collect::<Vec<_>>().join(",");
        let req = self.get("/coins/markets").query(&[
            ("vs_currency", currency),
            ("ids", id_list.as_str()),
            ("price_change_percentage", "24h,7d,30d"),
        ]);
        let body = self.fetch_text(req).await?;
        self.parse_markets(&body, symbols)
    }

    /// Simple tier: price only, for the whole batch.
    pub async fn fetch_simple_prices(
        &self,
        symbols: &BTreeSet<String>,
        currency: &str,
    ) -> Result<QuoteMap, CoreError> {
        if symbols.is_empty() {
            return Ok(QuoteMap::new());
        }
        let ids = self.id_lookup(symbols);
        let id_list = ids.keys().cloned().collect::<Vec<_>>().join(",");
        let req = self
            .get("/simple/price")
            .query(&[("ids", id_list.as_str()), ("vs_currencies", currency)]);
        let body = self.fetch_text(req).await?;
        self.parse_simple_prices(&body, symbols, currency)
    }

    // ── Response parsing ────────────────────────────────────────────

    /// Parse a `/coins/markets` body into quotes for the requested symbols.
    /// Records without a usable price are skipped.
    pub fn parse_markets(
        &self,
        body: &str,
        symbols: &BTreeSet<String>,
    ) -> Result<QuoteMap, CoreError> {
        let records: Vec<MarketRecord> =
            serde_json::from_str(body).map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to parse markets response: {e}"),
            })?;
        let ids = self.id_lookup(symbols);

        let quotes = records
            .into_iter()
            .filter_map(|r| {
                let symbol = ids.get(&r.id)?.clone();
                let quote = MarketQuote {
                    symbol: symbol.clone(),
                    price: r.current_price?,
                    change_24h: r
                        .price_change_percentage_24h_in_currency
                        .or(r.price_change_percentage_24h),
                    change_7d: r.price_change_percentage_7d_in_currency,
                    change_30d: r.price_change_percentage_30d_in_currency,
                };
                quote.is_valid().then_some((symbol, quote))
            })
            .collect();
        Ok(quotes)
    }

    /// Parse a `/simple/price` body (`{ id: { currency: price } }`).
    pub fn parse_simple_prices(
        &self,
        body: &str,
        symbols: &BTreeSet<String>,
        currency: &str,
    ) -> Result<QuoteMap, CoreError> {
        let resp: HashMap<String, HashMap<String, Option<f64>>> =
            serde_json::from_str(body).map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to parse simple price response: {e}"),
            })?;
        let ids = self.id_lookup(symbols);
        let currency = currency.to_lowercase();

        let quotes = ids
            .iter()
            .filter_map(|(id, symbol)| {
                let price = (*resp.get(id)?.get(&currency)?)?;
                let quote = MarketQuote::price_only(symbol.clone(), price);
                quote.is_valid().then_some((symbol.clone(), quote))
            })
            .collect();
        Ok(quotes)
    }

    /// Parse a `/coins/{id}/market_chart` body into ordered samples.
    pub fn parse_market_chart(&self, body: &str) -> Result<Vec<Sample>, CoreError> {
        let resp: MarketChartResponse =
            serde_json::from_str(body).map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to parse market chart: {e}"),
            })?;
        let mut points: Vec<Sample> = resp
            .prices
            .iter()
            .filter(|[ts, price]| ts.is_finite() && price.is_finite() && *price >= 0.0)
            .map(|[ts, price]| Sample::new(*ts as i64, *price))
            .collect();
        points.sort_by_key(|s| s.timestamp);
        Ok(points)
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── CoinGecko API response types ────────────────────────────────────

#[derive(Deserialize)]
struct MarketRecord {
    id: String,
    current_price: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    price_change_percentage_24h_in_currency: Option<f64>,
    price_change_percentage_7d_in_currency: Option<f64>,
    price_change_percentage_30d_in_currency: Option<f64>,
}

#[derive(Deserialize)]
struct MarketChartResponse {
    prices: Vec<[f64; 2]>,
}

// ── Chain tiers ─────────────────────────────────────────────────────

/// Rich tier of the quote chain (`/coins/markets`).
pub struct CoinGeckoMarkets {
    provider: Arc<CoinGeckoProvider>,
}

impl CoinGeckoMarkets {
    pub fn new(provider: Arc<CoinGeckoProvider>) -> Self {
        Self { provider }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl QuoteResolver for CoinGeckoMarkets {
    fn name(&self) -> &str {
        "CoinGecko markets"
    }

    async fn resolve(
        &self,
        symbols: &BTreeSet<String>,
        currency: &str,
    ) -> Result<QuoteMap, CoreError> {
        self.provider.fetch_markets(symbols, currency).await
    }
}

/// Simple tier of the quote chain (`/simple/price`).
pub struct CoinGeckoSimple {
    provider: Arc<CoinGeckoProvider>,
}

impl CoinGeckoSimple {
    pub fn new(provider: Arc<CoinGeckoProvider>) -> Self {
        Self { provider }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl QuoteResolver for CoinGeckoSimple {
    fn name(&self) -> &str {
        "CoinGecko simple price"
    }

    async fn resolve(
        &self,
        symbols: &BTreeSet<String>,
        currency: &str,
    ) -> Result<QuoteMap, CoreError> {
        self.provider.fetch_simple_prices(symbols, currency).await
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ChartSource for CoinGeckoProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn market_metrics(
        &self,
        symbol: &str,
        currency: &str,
    ) -> Result<MarketQuote, CoreError> {
        let upper = symbol.to_uppercase();
        let symbols = BTreeSet::from([upper.clone()]);
        let mut quotes = self.fetch_markets(&symbols, currency).await?;
        quotes.remove(&upper).ok_or_else(|| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("No market data for {upper}"),
        })
    }

    async fn price_chart(
        &self,
        symbol: &str,
        currency: &str,
        days: u32,
    ) -> Result<Vec<Sample>, CoreError> {
        let id = self.resolve_id(symbol);
        let days = days.max(1).to_string();
        let req = self
            .get(&format!("/coins/{id}/market_chart"))
            .query(&[("vs_currency", currency), ("days", days.as_str())]);
        let body = self.fetch_text(req).await?;
        self.parse_market_chart(&body)
    }
}
