use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::instrument::{InstrumentProfile, Timeframe};
use crate::models::sample::{round_to, Sample};
use crate::models::series::SeriesState;
use crate::services::rolling_window::RollingWindow;
use crate::services::series_generator::{step_price, PriceSeriesGenerator};

/// Everything one live chart panel owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelState {
    pub instrument: InstrumentProfile,
    pub timeframe: Timeframe,
    pub window: SeriesState,
    /// Full-precision price the stream continues from. The window only
    /// holds the rounded samples.
    pub spot_price: f64,
    pub paused: bool,
}

/// Transition functions for a live panel.
///
/// All of them are pure: they take the state by value and return the next
/// one, so the timer that drives them can live anywhere (see `PanelTicker`).
pub struct LivePanel;

impl LivePanel {
    /// Open a panel with a freshly generated history filling the window.
    pub fn open(instrument: InstrumentProfile, timeframe: Timeframe) -> PanelState {
        let now = chrono::Utc::now().timestamp_millis();
        Self::open_with(&mut rand::thread_rng(), instrument, timeframe, now)
    }

    pub fn open_with<R: Rng + ?Sized>(
        rng: &mut R,
        instrument: InstrumentProfile,
        timeframe: Timeframe,
        now_ms: i64,
    ) -> PanelState {
        let base_price = instrument.base_price;
        let (window, spot_price) =
            Self::seed_window(rng, &instrument, timeframe, base_price, now_ms);
        PanelState {
            instrument,
            timeframe,
            window,
            spot_price,
            paused: false,
        }
    }

    /// Advance the panel by one streaming step. A paused panel is returned
    /// untouched.
    pub fn tick<R: Rng + ?Sized>(rng: &mut R, state: PanelState, now_ms: i64) -> PanelState {
        if state.paused {
            return state;
        }
        let PanelState {
            instrument,
            timeframe,
            window,
            spot_price,
            paused,
        } = state;

        let spot_price = step_price(rng, spot_price, instrument.volatility);
        let sample = Sample::new(now_ms, round_to(spot_price, instrument.precision));
        let window = RollingWindow::insert(window, sample, timeframe.capacity());

        PanelState {
            instrument,
            timeframe,
            window,
            spot_price,
            paused,
        }
    }

    /// Switch timeframe. The old window is discarded and a new history is
    /// generated from the current spot price.
    pub fn set_timeframe<R: Rng + ?Sized>(
        rng: &mut R,
        state: PanelState,
        timeframe: Timeframe,
        now_ms: i64,
    ) -> PanelState {
        log::debug!(
            "{} panel: timeframe {} -> {timeframe}, reseeding from {}",
            state.instrument.symbol,
            state.timeframe,
            state.spot_price
        );
        let (window, spot_price) =
            Self::seed_window(rng, &state.instrument, timeframe, state.spot_price, now_ms);
        PanelState {
            timeframe,
            window,
            spot_price,
            ..state
        }
    }

    pub fn set_paused(state: PanelState, paused: bool) -> PanelState {
        PanelState { paused, ..state }
    }

    fn seed_window<R: Rng + ?Sized>(
        rng: &mut R,
        instrument: &InstrumentProfile,
        timeframe: Timeframe,
        start_price: f64,
        now_ms: i64,
    ) -> (SeriesState, f64) {
        let capacity = timeframe.capacity();
        let generator =
            PriceSeriesGenerator::for_instrument(instrument, timeframe.history_tick_ms());
        let (history, spot_price) = generator.walk_with(
            rng,
            start_price,
            capacity.saturating_sub(1),
            instrument.volatility,
            now_ms,
        );
        (RollingWindow::seed(history, capacity), spot_price)
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use ticker::{PanelCommand, PanelTicker};

#[cfg(not(target_arch = "wasm32"))]
mod ticker {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tokio::sync::{mpsc, watch};
    use tokio::task::JoinHandle;
    use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

    use super::{LivePanel, PanelState};
    use crate::models::instrument::Timeframe;

    /// Control messages for a running panel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum PanelCommand {
        Pause,
        Resume,
        SetTimeframe(Timeframe),
    }

    /// Drives one panel on a tokio interval.
    ///
    /// The spawned task is the only writer of the panel state; readers get
    /// snapshots through `subscribe()`. Dropping the ticker (or calling
    /// `stop`) aborts the task, so no tick can land after teardown.
    pub struct PanelTicker {
        commands: mpsc::UnboundedSender<PanelCommand>,
        snapshots: watch::Receiver<PanelState>,
        task: JoinHandle<()>,
    }

    impl PanelTicker {
        /// Start ticking `state` at its timeframe's stream period.
        /// Must be called from within a tokio runtime.
        pub fn spawn(state: PanelState) -> Self {
            Self::spawn_with_rng(state, StdRng::from_entropy())
        }

        pub fn spawn_with_rng(state: PanelState, rng: StdRng) -> Self {
            let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
            let (snap_tx, snap_rx) = watch::channel(state.clone());
            log::debug!(
                "{} panel: ticker started ({})",
                state.instrument.symbol,
                state.timeframe
            );
            let task = tokio::spawn(run(state, rng, cmd_rx, snap_tx));
            Self {
                commands: cmd_tx,
                snapshots: snap_rx,
                task,
            }
        }

        /// A receiver that always holds the latest panel state.
        pub fn subscribe(&self) -> watch::Receiver<PanelState> {
            self.snapshots.clone()
        }

        /// Current panel state.
        pub fn snapshot(&self) -> PanelState {
            self.snapshots.borrow().clone()
        }

        /// Queue a command. Returns `false` once the ticker has stopped.
        pub fn send(&self, command: PanelCommand) -> bool {
            self.commands.send(command).is_ok()
        }

        pub fn pause(&self) -> bool {
            self.send(PanelCommand::Pause)
        }

        pub fn resume(&self) -> bool {
            self.send(PanelCommand::Resume)
        }

        pub fn set_timeframe(&self, timeframe: Timeframe) -> bool {
            self.send(PanelCommand::SetTimeframe(timeframe))
        }

        pub fn is_running(&self) -> bool {
            !self.task.is_finished()
        }

        /// Stop ticking and return the final state.
        pub fn stop(self) -> PanelState {
            self.task.abort();
            let last = self.snapshots.borrow().clone();
            last
        }
    }

    impl Drop for PanelTicker {
        fn drop(&mut self) {
            self.task.abort();
        }
    }

    async fn run(
        mut state: PanelState,
        mut rng: StdRng,
        mut commands: mpsc::UnboundedReceiver<PanelCommand>,
        snapshots: watch::Sender<PanelState>,
    ) {
        // Disarmed (None) while paused.
        let mut timer = arm(&state);
        loop {
            tokio::select! {
                _ = next_tick(&mut timer) => {
                    let now = chrono::Utc::now().timestamp_millis();
                    state = LivePanel::tick(&mut rng, state, now);
                }
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    state = match command {
                        PanelCommand::Pause => LivePanel::set_paused(state, true),
                        PanelCommand::Resume => LivePanel::set_paused(state, false),
                        PanelCommand::SetTimeframe(timeframe) => {
                            let now = chrono::Utc::now().timestamp_millis();
                            LivePanel::set_timeframe(&mut rng, state, timeframe, now)
                        }
                    };
                    match command {
                        PanelCommand::Resume if timer.is_some() => {}
                        _ => timer = arm(&state),
                    }
                }
            }
            if snapshots.send(state.clone()).is_err() {
                break;
            }
        }
        log::debug!("{} panel: ticker stopped", state.instrument.symbol);
    }

    /// A fresh interval for the panel's timeframe, first tick one full
    /// period from now. `None` for a paused panel.
    fn arm(state: &PanelState) -> Option<Interval> {
        if state.paused {
            return None;
        }
        let period = state.timeframe.stream_period();
        let mut timer = interval_at(Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Some(timer)
    }

    async fn next_tick(timer: &mut Option<Interval>) {
        match timer {
            Some(timer) => {
                timer.tick().await;
            }
            None => std::future::pending().await,
        }
    }
}
