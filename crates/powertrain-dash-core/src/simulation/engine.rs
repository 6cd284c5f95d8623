//! Simulation engine lifecycle

use super::step::{self, TickDraws};
use super::DrivingMode;
use crate::state::StateHandle;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Default simulation tick period
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Periodic random-drive simulator feeding a [`StateHandle`].
///
/// `Stopped` until [`start`](Self::start) schedules the tick task, back to
/// `Stopped` on [`stop`](Self::stop). The schedule is owned through its
/// `JoinHandle`, so at most one tick task exists per engine.
pub struct SimulationEngine {
    state: StateHandle,
    rng: Arc<Mutex<StdRng>>,
    tick_interval: Duration,
    task: Option<JoinHandle<()>>,
    mode: DrivingMode,
}

impl SimulationEngine {
    /// Create an engine seeded from OS entropy
    pub fn new(state: StateHandle) -> Self {
        Self::with_rng(state, StdRng::from_entropy())
    }

    /// Create an engine with a fixed seed for reproducible runs
    pub fn with_seed(state: StateHandle, seed: u64) -> Self {
        Self::with_rng(state, StdRng::seed_from_u64(seed))
    }

    fn with_rng(state: StateHandle, rng: StdRng) -> Self {
        Self {
            state,
            rng: Arc::new(Mutex::new(rng)),
            tick_interval: DEFAULT_TICK_INTERVAL,
            task: None,
            mode: DrivingMode::default(),
        }
    }

    /// Override the tick period. Takes effect on the next `start`.
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    /// Period between ticks
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Mode of the current (or last) schedule
    pub fn mode(&self) -> DrivingMode {
        self.mode
    }

    /// True while a tick task is scheduled
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Schedule the periodic tick for `mode`, replacing any existing schedule.
    ///
    /// The first tick fires one period after the call. After a stall the
    /// next tick runs once, then the period restarts from there. Must be
    /// called from within a Tokio runtime.
    pub fn start(&mut self, mode: DrivingMode) {
        self.cancel_task();
        self.mode = mode;

        let state = self.state.clone();
        let rng = self.rng.clone();
        let period = self.tick_interval;

        let mut ticker = interval_at(Instant::now() + period, period);
        // A stalled tick is taken late, never made up in a burst
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(%mode, ?period, "Simulation started");

        self.task = Some(tokio::spawn(async move {
            loop {
                ticker.tick().await;
                tick(&state, &rng, mode);
            }
        }));
    }

    /// Cancel the scheduled tick. Idempotent.
    pub fn stop(&mut self) {
        if self.cancel_task() {
            tracing::info!("Simulation stopped");
        }
    }

    /// Run one tick immediately against `mode`.
    ///
    /// Does nothing unless the vehicle state says the engine is running.
    /// Returns whether an update was applied.
    pub fn simulate_tick(&self, mode: DrivingMode) -> bool {
        tick(&self.state, &self.rng, mode)
    }

    fn cancel_task(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for SimulationEngine {
    fn drop(&mut self) {
        self.cancel_task();
    }
}

fn tick(state: &StateHandle, rng: &Mutex<StdRng>, mode: DrivingMode) -> bool {
    state.apply_with(|current| {
        if !current.is_running {
            return None;
        }
        let draws = {
            let mut rng = rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            TickDraws::sample(&mut *rng)
        };
        let update = step::advance(current, mode.profile(), &draws);
        tracing::trace!(?update, "Simulation tick");
        Some(update)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{StateUpdate, VehicleState};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_state() -> (StateHandle, Arc<AtomicUsize>) {
        let state = StateHandle::default();
        let renders = Arc::new(AtomicUsize::new(0));
        let r = renders.clone();
        state.subscribe(move |_: &VehicleState| {
            r.fetch_add(1, Ordering::SeqCst);
        });
        (state, renders)
    }

    #[test]
    fn test_tick_is_noop_when_not_running() {
        let (state, renders) = counting_state();
        let engine = SimulationEngine::with_seed(state.clone(), 7);

        assert!(!engine.simulate_tick(DrivingMode::Sport));
        assert_eq!(renders.load(Ordering::SeqCst), 0);
        assert_eq!(state.snapshot(), VehicleState::default());
    }

    #[test]
    fn test_tick_applies_one_update() {
        let (state, renders) = counting_state();
        state.apply_silent(&StateUpdate::new().running(true));
        let engine = SimulationEngine::with_seed(state.clone(), 7);

        assert!(engine.simulate_tick(DrivingMode::Highway));
        assert_eq!(renders.load(Ordering::SeqCst), 1);

        // Highway targets are at least 60 km/h, so one step from rest is at least 6
        let speed = state.snapshot().speed;
        assert!((6.0..12.0).contains(&speed), "speed {speed}");
    }

    #[test]
    fn test_seeded_engines_agree() {
        let a = StateHandle::default();
        let b = StateHandle::default();
        for handle in [&a, &b] {
            handle.apply_silent(&StateUpdate::new().running(true));
        }
        let engine_a = SimulationEngine::with_seed(a.clone(), 42);
        let engine_b = SimulationEngine::with_seed(b.clone(), 42);

        for _ in 0..50 {
            engine_a.simulate_tick(DrivingMode::Sport);
            engine_b.simulate_tick(DrivingMode::Sport);
        }

        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_schedules_ticks() {
        let (state, renders) = counting_state();
        state.apply_silent(&StateUpdate::new().running(true));
        let mut engine = SimulationEngine::with_seed(state, 1);

        engine.start(DrivingMode::City);
        assert!(engine.is_running());
        tokio::time::sleep(Duration::from_millis(350)).await;

        assert_eq!(renders.load(Ordering::SeqCst), 3);
        engine.stop();
        assert!(!engine.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let (state, _) = counting_state();
        let mut engine = SimulationEngine::new(state);
        engine.stop();
        engine.start(DrivingMode::Idle);
        engine.stop();
        engine.stop();
        assert!(!engine.is_running());
    }
}
