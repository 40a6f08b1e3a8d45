use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a synthetic price stream behaves for one tracked instrument.
///
/// The generator itself is instrument-agnostic; everything that differs
/// between a volatile asset and a pegged one lives here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentProfile {
    /// Ticker symbol, uppercased (e.g., "XAU", "USDT", "BTC")
    pub symbol: String,

    /// Human-readable name (e.g., "Gold")
    pub name: String,

    /// Price the random walk starts from
    pub base_price: f64,

    /// Amplitude of each step: price *= 1 + u * volatility, u in [-0.5, 0.5)
    pub volatility: f64,

    /// Decimal places stored and displayed
    pub precision: u32,
}

impl InstrumentProfile {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        base_price: f64,
        volatility: f64,
        precision: u32,
    ) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            name: name.into(),
            base_price,
            volatility,
            precision,
        }
    }

    /// Gold spot, quoted per troy ounce.
    pub fn gold() -> Self {
        Self::new("XAU", "Gold", 2350.0, 0.002, 2)
    }

    /// Tether: pegged, so the walk barely moves.
    pub fn usdt() -> Self {
        Self::new("USDT", "Tether", 1.0, 0.0004, 4)
    }

    pub fn bitcoin() -> Self {
        Self::new("BTC", "Bitcoin", 65_000.0, 0.01, 2)
    }
}

/// The span of time a live panel shows.
///
/// Each timeframe fixes the window capacity, how far apart the seeded
/// history points are, and how often the live stream ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[default]
    Live,
    OneHour,
    OneDay,
    OneWeek,
    OneMonth,
}

impl Timeframe {
    pub const ALL: [Timeframe; 5] = [
        Timeframe::Live,
        Timeframe::OneHour,
        Timeframe::OneDay,
        Timeframe::OneWeek,
        Timeframe::OneMonth,
    ];

    /// Number of samples the window holds.
    pub fn capacity(&self) -> usize {
        match self {
            Timeframe::Live => 30,
            Timeframe::OneHour => 60,
            Timeframe::OneDay => 96,
            Timeframe::OneWeek => 84,
            Timeframe::OneMonth => 90,
        }
    }

    /// Spacing between points of the seeded history, in milliseconds.
    pub fn history_tick_ms(&self) -> i64 {
        const MINUTE: i64 = 60_000;
        match self {
            Timeframe::Live => 2_000,
            Timeframe::OneHour => MINUTE,
            Timeframe::OneDay => 15 * MINUTE,
            Timeframe::OneWeek => 120 * MINUTE,
            Timeframe::OneMonth => 480 * MINUTE,
        }
    }

    /// How often the live stream appends a sample.
    pub fn stream_period(&self) -> Duration {
        match self {
            Timeframe::Live => Duration::from_secs(2),
            Timeframe::OneHour => Duration::from_secs(5),
            Timeframe::OneDay | Timeframe::OneWeek | Timeframe::OneMonth => {
                Duration::from_secs(10)
            }
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timeframe::Live => write!(f, "Live"),
            Timeframe::OneHour => write!(f, "1H"),
            Timeframe::OneDay => write!(f, "1D"),
            Timeframe::OneWeek => write!(f, "1W"),
            Timeframe::OneMonth => write!(f, "1M"),
        }
    }
}
