use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::Mutex as AsyncMutex;

use crate::models::quote::{CoinChart, MarketQuote, QuoteMap};
use crate::providers::registry::ResolverChain;
use crate::providers::traits::ChartSource;
use crate::storage::quote_cache::QuoteCache;

/// Resolves quotes through the resolver chain with a persisted fallback.
///
/// Per call (one chain for the whole batch, not per symbol):
/// 1. live tiers in priority order, each asked only for what is unresolved
/// 2. if nothing at all was resolved, the last cached snapshot
/// 3. anything still unresolved is omitted from the result
///
/// A non-empty live result replaces the cached snapshot wholesale. No error
/// ever reaches the caller; failures show up as missing symbols.
///
/// Overlapping calls on one fetcher are serialized (`fetch_quotes`) or
/// dropped (`try_fetch_quotes`).
pub struct MarketDataFetcher {
    chain: ResolverChain,
    cache: QuoteCache,
    chart_source: Option<Arc<dyn ChartSource>>,
    currency: String,
    in_flight: AsyncMutex<()>,
}

impl MarketDataFetcher {
    pub fn new(chain: ResolverChain, cache: QuoteCache, currency: impl Into<String>) -> Self {
        Self {
            chain,
            cache,
            chart_source: None,
            currency: currency.into().to_lowercase(),
            in_flight: AsyncMutex::new(()),
        }
    }

    /// Attach the source used by `fetch_coin_chart`.
    pub fn with_chart_source(mut self, source: Arc<dyn ChartSource>) -> Self {
        self.chart_source = Some(source);
        self
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn cache(&self) -> &QuoteCache {
        &self.cache
    }

    /// Fetch quotes for `symbols`, waiting for any call already in flight.
    pub async fn fetch_quotes<S: AsRef<str>>(&self, symbols: &[S]) -> QuoteMap {
        let _guard = self.in_flight.lock().await;
        self.fetch_unguarded(symbols).await
    }

    /// Fetch quotes unless a call is already in flight, in which case this
    /// one is dropped and `None` is returned.
    pub async fn try_fetch_quotes<S: AsRef<str>>(&self, symbols: &[S]) -> Option<QuoteMap> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            log::debug!("Quote fetch already in flight, dropping overlapping request");
            return None;
        };
        Some(self.fetch_unguarded(symbols).await)
    }

    async fn fetch_unguarded<S: AsRef<str>>(&self, symbols: &[S]) -> QuoteMap {
        let requested: BTreeSet<String> = symbols
            .iter()
            .map(|s| s.as_ref().trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        if requested.is_empty() {
            return QuoteMap::new();
        }

        let live = self.chain.resolve(&requested, &self.currency).await;
        if !live.is_empty() {
            if let Err(e) = self.cache.replace(&live) {
                log::warn!("Failed to persist quote snapshot: {e}");
            }
            return live;
        }

        let cached: QuoteMap = self
            .cache
            .load()
            .into_iter()
            .filter(|(symbol, _)| requested.contains(symbol))
            .collect();
        if !cached.is_empty() {
            log::info!(
                "All live sources failed; serving {} of {} quotes from cache",
                cached.len(),
                requested.len()
            );
        }
        cached
    }

    /// History and headline metrics for one symbol over the last `days`.
    ///
    /// Metrics come from the rich endpoint and the series from the chart
    /// endpoint. If only the series arrives, the quote is derived from its
    /// newest point. Total failure yields an empty chart; there is no cache.
    pub async fn fetch_coin_chart(&self, symbol: &str, days: u32) -> CoinChart {
        let upper = symbol.trim().to_uppercase();
        let Some(source) = &self.chart_source else {
            return CoinChart::empty(upper);
        };

        let quote = match source.market_metrics(&upper, &self.currency).await {
            Ok(q) if q.is_valid() => Some(q),
            Ok(_) => None,
            Err(e) => {
                log::warn!("{} metrics for {upper} failed: {e}", source.name());
                None
            }
        };
        let points = match source.price_chart(&upper, &self.currency, days).await {
            Ok(points) => points,
            Err(e) => {
                log::warn!("{} chart for {upper} failed: {e}", source.name());
                Vec::new()
            }
        };

        let quote = quote.or_else(|| {
            points
                .last()
                .map(|p| MarketQuote::price_only(upper.clone(), p.price))
        });

        CoinChart {
            symbol: upper,
            quote,
            points,
        }
    }
}
