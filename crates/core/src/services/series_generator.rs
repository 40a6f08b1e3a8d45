use rand::Rng;

use crate::models::instrument::InstrumentProfile;
use crate::models::sample::{round_to, Sample};

/// Produces synthetic price series by random-walk perturbation.
///
/// Each step multiplies the previous price by `1 + u * volatility` with `u`
/// drawn uniformly from `[-0.5, 0.5)`. The walk compounds on full-precision
/// prices; only the stored sample is rounded to `precision` places.
///
/// The `*_with` variants take the RNG and clock explicitly so callers (and
/// tests) can make a series reproducible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSeriesGenerator {
    precision: u32,
    tick_ms: i64,
}

impl PriceSeriesGenerator {
    pub fn new(precision: u32, tick_ms: i64) -> Self {
        Self { precision, tick_ms }
    }

    pub fn for_instrument(instrument: &InstrumentProfile, tick_ms: i64) -> Self {
        Self::new(instrument.precision, tick_ms)
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn tick_ms(&self) -> i64 {
        self.tick_ms
    }

    /// `period_count + 1` samples starting at `base_price`, the newest one
    /// stamped "now".
    pub fn generate(&self, base_price: f64, period_count: usize, volatility: f64) -> Vec<Sample> {
        let now = chrono::Utc::now().timestamp_millis();
        self.generate_with(&mut rand::thread_rng(), base_price, period_count, volatility, now)
    }

    /// Deterministic form of `generate`: the series ends at `end_ts` and
    /// timestamps step back one tick per sample.
    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        base_price: f64,
        period_count: usize,
        volatility: f64,
        end_ts: i64,
    ) -> Vec<Sample> {
        self.walk_with(rng, base_price, period_count, volatility, end_ts)
            .0
    }

    /// Like `generate_with`, but also returns the unrounded price the walk
    /// ended on, so a stream can keep compounding from it.
    pub fn walk_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        base_price: f64,
        period_count: usize,
        volatility: f64,
        end_ts: i64,
    ) -> (Vec<Sample>, f64) {
        let start_ts = end_ts - self.tick_ms * period_count as i64;
        let mut samples = Vec::with_capacity(period_count + 1);
        let mut price = base_price;
        samples.push(Sample::new(start_ts, round_to(price, self.precision)));

        for step in 1..=period_count {
            price = step_price(rng, price, volatility);
            samples.push(Sample::new(
                start_ts + self.tick_ms * step as i64,
                round_to(price, self.precision),
            ));
        }
        (samples, price)
    }

    /// One streaming step from `last_price`, stamped "now".
    pub fn next_sample(&self, last_price: f64, volatility: f64) -> Sample {
        let now = chrono::Utc::now().timestamp_millis();
        self.next_sample_with(&mut rand::thread_rng(), last_price, volatility, now)
    }

    pub fn next_sample_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        last_price: f64,
        volatility: f64,
        timestamp: i64,
    ) -> Sample {
        let price = step_price(rng, last_price, volatility);
        Sample::new(timestamp, round_to(price, self.precision))
    }
}

/// One unrounded random-walk step from `price`.
pub fn step_price<R: Rng + ?Sized>(rng: &mut R, price: f64, volatility: f64) -> f64 {
    let u: f64 = rng.gen::<f64>() - 0.5;
    price * (1.0 + u * volatility)
}
