use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::sample::Sample;

/// The bounded window of samples backing one chart panel, plus its statistics.
///
/// Invariants (maintained by `RollingWindow::insert`):
/// - samples are ordered oldest → newest
/// - `high`, `low`, `average` describe exactly the samples currently held
/// - `percent_change_from_first` is measured against the *current* oldest
///   sample, so the baseline moves forward as old samples are evicted
///
/// For an empty window all statistics are `0.0` and carry no meaning; use
/// `is_empty()` before reading them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesState {
    pub samples: VecDeque<Sample>,
    pub high: f64,
    pub low: f64,
    pub average: f64,
    pub percent_change_from_first: f64,
}

impl SeriesState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.front()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Latest price in the window, if any.
    pub fn last_price(&self) -> Option<f64> {
        self.samples.back().map(|s| s.price)
    }

    /// Recompute every statistic from the samples currently held.
    pub(crate) fn recompute(&mut self) {
        let (Some(first), Some(last)) = (self.samples.front(), self.samples.back()) else {
            self.high = 0.0;
            self.low = 0.0;
            self.average = 0.0;
            self.percent_change_from_first = 0.0;
            return;
        };
        let first_price = first.price;
        let last_price = last.price;

        let mut high = f64::NEG_INFINITY;
        let mut low = f64::INFINITY;
        let mut sum = 0.0;
        for s in &self.samples {
            high = high.max(s.price);
            low = low.min(s.price);
            sum += s.price;
        }

        self.high = high;
        self.low = low;
        self.average = sum / self.samples.len() as f64;
        self.percent_change_from_first = if first_price != 0.0 {
            (last_price - first_price) / first_price * 100.0
        } else {
            0.0
        };
    }
}
