use crate::models::sample::Sample;
use crate::models::series::SeriesState;

/// Fixed-capacity FIFO window over a chronological price stream.
pub struct RollingWindow;

impl RollingWindow {
    /// Append `sample`, evict from the front until at most `capacity`
    /// samples remain, and recompute statistics over what is left.
    ///
    /// Percent change is measured against the oldest sample still held, so
    /// it always describes the visible window rather than the whole session.
    pub fn insert(mut window: SeriesState, sample: Sample, capacity: usize) -> SeriesState {
        window.samples.push_back(sample);
        while window.samples.len() > capacity {
            window.samples.pop_front();
        }
        window.recompute();
        window
    }

    /// Build a window from an initial history, keeping the newest `capacity`
    /// samples.
    pub fn seed(samples: impl IntoIterator<Item = Sample>, capacity: usize) -> SeriesState {
        samples
            .into_iter()
            .fold(SeriesState::new(), |w, s| Self::insert(w, s, capacity))
    }
}
