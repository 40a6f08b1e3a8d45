pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::sync::Arc;

use models::{
    instrument::{InstrumentProfile, Timeframe},
    projection::{ProjectionParams, ProjectionRow, ProjectionSummary},
    quote::{CoinChart, QuoteMap},
    settings::DashboardSettings,
};
use providers::{coingecko::CoinGeckoProvider, registry::ResolverChain};
use services::{
    live_panel::{LivePanel, PanelState},
    market_service::MarketDataFetcher,
    projection_service::ReturnProjector,
};
use storage::{kv::KeyValueStore, quote_cache::QuoteCache};

use errors::CoreError;

/// Longest chart history accepted by `coin_chart`, in days.
const MAX_CHART_DAYS: u32 = 365;

/// Main entry point for the Market Pulse core library.
///
/// Owns the quote fetcher (with its persisted snapshot) and exposes the
/// panel and planner computations the dashboard views call into.
#[must_use]
pub struct MarketDashboard {
    settings: DashboardSettings,
    fetcher: MarketDataFetcher,
}

impl std::fmt::Debug for MarketDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketDashboard")
            .field("settings", &self.settings)
            .field("currency", &self.fetcher.currency())
            .field("cache_key", &self.fetcher.cache().key())
            .finish()
    }
}

impl MarketDashboard {
    /// Build a dashboard talking to the live CoinGecko API, persisting the
    /// quote snapshot in `store`.
    pub fn new(settings: DashboardSettings, store: Arc<dyn KeyValueStore>) -> Self {
        let provider = Arc::new(CoinGeckoProvider::from_settings(&settings));
        let chain = ResolverChain::new_with_defaults(&settings);
        let cache = QuoteCache::new(store, settings.cache_key.clone());
        let fetcher = MarketDataFetcher::new(chain, cache, settings.vs_currency.clone())
            .with_chart_source(provider);
        Self { settings, fetcher }
    }

    /// Build a dashboard around an already configured fetcher.
    pub fn with_fetcher(settings: DashboardSettings, fetcher: MarketDataFetcher) -> Self {
        Self { settings, fetcher }
    }

    #[must_use]
    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    // ── Market list ─────────────────────────────────────────────────

    /// Quotes for the configured `tracked_symbols`.
    pub async fn tracked_quotes(&self) -> QuoteMap {
        self.fetcher.fetch_quotes(&self.settings.tracked_symbols).await
    }

    /// Quotes for arbitrary symbols. Never fails; unresolved symbols are
    /// simply absent.
    pub async fn quotes<S: AsRef<str>>(&self, symbols: &[S]) -> QuoteMap {
        self.fetcher.fetch_quotes(symbols).await
    }

    /// Like `quotes`, but drops the request if another one is in flight.
    pub async fn refresh_quotes<S: AsRef<str>>(&self, symbols: &[S]) -> Option<QuoteMap> {
        self.fetcher.try_fetch_quotes(symbols).await
    }

    /// Price history and metrics for one coin.
    pub async fn coin_chart(&self, symbol: &str, days: u32) -> Result<CoinChart, CoreError> {
        if symbol.trim().is_empty() {
            return Err(CoreError::ValidationError("Symbol must not be empty".into()));
        }
        if days == 0 || days > MAX_CHART_DAYS {
            return Err(CoreError::ValidationError(format!(
                "Chart range must be between 1 and {MAX_CHART_DAYS} days, got {days}"
            )));
        }
        Ok(self.fetcher.fetch_coin_chart(symbol, days).await)
    }

    // ── Live panels ─────────────────────────────────────────────────

    /// Open a synthetic live panel for `instrument`.
    pub fn open_panel(&self, instrument: InstrumentProfile, timeframe: Timeframe) -> PanelState {
        LivePanel::open(instrument, timeframe)
    }

    // ── Planner ─────────────────────────────────────────────────────

    /// Validate planner inputs and project them year by year.
    pub fn project_returns(
        &self,
        params: &ProjectionParams,
    ) -> Result<(Vec<ProjectionRow>, ProjectionSummary), CoreError> {
        let rows = ReturnProjector::project_checked(params)?;
        let summary = ProjectionSummary::from_rows(&rows).ok_or_else(|| {
            CoreError::ValidationError("Projection produced no rows".into())
        })?;
        Ok((rows, summary))
    }
}
