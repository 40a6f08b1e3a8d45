use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::errors::CoreError;
use crate::models::quote::{MarketQuote, QuoteMap};
use crate::models::sample::Sample;

/// One tier of the quote fallback chain.
///
/// A resolver is asked for a batch of symbols and answers with whatever it
/// could find. Symbols it does not know are simply missing from the map;
/// an `Err` means the whole tier failed (unreachable, bad status, bad JSON).
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait QuoteResolver: Send + Sync {
    /// Human-readable name of this resolver (for logs/errors).
    fn name(&self) -> &str;

    /// Resolve quotes for uppercased `symbols` in `currency`.
    async fn resolve(
        &self,
        symbols: &BTreeSet<String>,
        currency: &str,
    ) -> Result<QuoteMap, CoreError>;
}

/// Source of a single instrument's history and headline metrics.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ChartSource: Send + Sync {
    fn name(&self) -> &str;

    /// Current price plus multi-period changes for one symbol.
    async fn market_metrics(&self, symbol: &str, currency: &str)
        -> Result<MarketQuote, CoreError>;

    /// Ordered `(timestamp, price)` series covering the last `days` days.
    async fn price_chart(
        &self,
        symbol: &str,
        currency: &str,
        days: u32,
    ) -> Result<Vec<Sample>, CoreError>;
}
