use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::sample::Sample;

/// Snapshot of one instrument's price and period-over-period changes.
///
/// A `None` change field means no source that was tried could provide it
/// (e.g. the quote came from the simple-price endpoint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketQuote {
    /// Uppercased ticker symbol (e.g., "BTC")
    pub symbol: String,

    /// Current price in the configured quote currency
    pub price: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_24h: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_7d: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_30d: Option<f64>,
}

impl MarketQuote {
    /// A price-only quote with every change field absent.
    pub fn price_only(symbol: impl Into<String>, price: f64) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            price,
            change_24h: None,
            change_7d: None,
            change_30d: None,
        }
    }

    /// Prices must be finite and non-negative to be accepted from any source.
    pub fn is_valid(&self) -> bool {
        self.price.is_finite() && self.price >= 0.0
    }
}

/// Quotes keyed by uppercased symbol. Ordered so serialization is stable.
pub type QuoteMap = BTreeMap<String, MarketQuote>;

/// Historical chart and headline metrics for a single instrument.
///
/// An empty chart (no quote, no points) is what a total fetch failure
/// looks like; it is never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinChart {
    pub symbol: String,
    pub quote: Option<MarketQuote>,
    pub points: Vec<Sample>,
}

impl CoinChart {
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            quote: None,
            points: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.quote.is_none() && self.points.is_empty()
    }
}
