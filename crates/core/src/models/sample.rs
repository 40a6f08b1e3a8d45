use serde::{Deserialize, Serialize};

/// A single timestamped price observation.
///
/// `timestamp` is epoch milliseconds. Samples are immutable once created;
/// the generator produces them and a `SeriesState` owns them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: i64,
    pub price: f64,
}

impl Sample {
    pub fn new(timestamp: i64, price: f64) -> Self {
        Self { timestamp, price }
    }

    /// The sample time as a UTC datetime, if the timestamp is in range.
    pub fn datetime(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.timestamp)
    }
}

/// Round `value` to `places` decimal places (half away from zero).
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
