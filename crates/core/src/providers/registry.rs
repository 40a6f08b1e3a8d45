use std::collections::BTreeSet;
use std::sync::Arc;

use crate::models::quote::QuoteMap;
use crate::models::settings::DashboardSettings;

use super::coingecko::{CoinGeckoMarkets, CoinGeckoProvider, CoinGeckoSimple};
use super::traits::QuoteResolver;

/// Ordered list of quote resolvers, richest source first.
///
/// `resolve` walks the tiers in registration order, asking each one only for
/// the symbols still unresolved, and stops as soon as every symbol has a
/// quote. A failing tier contributes nothing; it never aborts the walk.
pub struct ResolverChain {
    resolvers: Vec<Box<dyn QuoteResolver>>,
}

impl ResolverChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self {
            resolvers: Vec::new(),
        }
    }

    /// The default live chain: CoinGecko markets, then CoinGecko simple price.
    pub fn new_with_defaults(settings: &DashboardSettings) -> Self {
        let provider = Arc::new(CoinGeckoProvider::from_settings(settings));
        let mut chain = Self::new();
        chain.register(Box::new(CoinGeckoMarkets::new(Arc::clone(&provider))));
        chain.register(Box::new(CoinGeckoSimple::new(provider)));
        chain
    }

    /// Append a resolver at the lowest priority.
    pub fn register(&mut self, resolver: Box<dyn QuoteResolver>) {
        self.resolvers.push(resolver);
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Names of the registered resolvers, in priority order.
    pub fn resolver_names(&self) -> Vec<String> {
        self.resolvers.iter().map(|r| r.name().to_string()).collect()
    }

    /// Merge what every tier can contribute for `symbols`.
    ///
    /// Earlier tiers win: a later tier is only consulted for symbols no
    /// earlier tier resolved, and quotes it returns for anything else are
    /// ignored.
    pub async fn resolve(&self, symbols: &BTreeSet<String>, currency: &str) -> QuoteMap {
        let mut merged = QuoteMap::new();
        let mut pending: BTreeSet<String> = symbols.clone();

        for resolver in &self.resolvers {
            if pending.is_empty() {
                break;
            }
            match resolver.resolve(&pending, currency).await {
                Ok(quotes) => {
                    let before = merged.len();
                    for (symbol, quote) in quotes {
                        if quote.is_valid() && pending.remove(&symbol) {
                            merged.insert(symbol, quote);
                        }
                    }
                    log::debug!(
                        "{} resolved {} of {} pending symbols",
                        resolver.name(),
                        merged.len() - before,
                        merged.len() - before + pending.len()
                    );
                }
                Err(e) => {
                    log::warn!("{} failed, trying next source: {e}", resolver.name());
                }
            }
        }

        merged
    }
}

impl Default for ResolverChain {
    fn default() -> Self {
        Self::new()
    }
}
