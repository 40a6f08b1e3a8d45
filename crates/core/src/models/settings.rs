use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Dashboard configuration. Every field has a default, so a partial JSON
/// document is enough to override just what differs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// Quote currency passed to the price API (e.g., "usd", "eur").
    pub vs_currency: String,

    /// Base URL of the CoinGecko-compatible price API.
    pub api_base_url: String,

    /// Optional demo/pro API key, sent as a request header.
    pub api_key: Option<String>,

    pub request_timeout_secs: u64,

    /// Storage key under which the last successful quote snapshot is kept.
    pub cache_key: String,

    /// Symbols shown in the market list.
    pub tracked_symbols: Vec<String>,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            vs_currency: "usd".to_string(),
            api_base_url: "https://api.coingecko.com/api/v3".to_string(),
            api_key: None,
            request_timeout_secs: 30,
            cache_key: "marketQuotes".to_string(),
            tracked_symbols: vec!["BTC".into(), "ETH".into(), "USDT".into()],
        }
    }
}

impl DashboardSettings {
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Self = serde_json::from_str(json)?;
        if settings.vs_currency.trim().is_empty() {
            return Err(CoreError::InvalidParameter(
                "vs_currency must not be empty".into(),
            ));
        }
        if settings.cache_key.trim().is_empty() {
            return Err(CoreError::InvalidParameter(
                "cache_key must not be empty".into(),
            ));
        }
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(self).map_err(|e| CoreError::Serialization(e.to_string()))
    }
}
