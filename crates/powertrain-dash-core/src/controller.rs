//! Dashboard Controller
//!
//! Maps the cluster's user controls (start/stop, reset, mode select) onto the
//! simulation engine and the vehicle state, and fronts the live signal feed.
//! Constructed once by the application with its collaborators injected.

use crate::render::Readout;
use crate::signal::SignalClient;
use crate::simulation::{DrivingMode, SimulationEngine};
use crate::state::{Gear, StateHandle, StateUpdate, VehicleState};
use chrono::{DateTime, Local};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
struct DriveStart {
    started: Instant,
    started_at: DateTime<Local>,
}

/// Start time of the current drive.
///
/// Cloneable so render sinks can show the driving time on every redraw.
/// Reading it never touches the vehicle state.
#[derive(Debug, Clone, Default)]
pub struct DriveClock {
    start: Arc<Mutex<Option<DriveStart>>>,
}

impl DriveClock {
    fn lock(&self) -> MutexGuard<'_, Option<DriveStart>> {
        self.start.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin(&self) -> DateTime<Local> {
        let start = DriveStart {
            started: Instant::now(),
            started_at: Local::now(),
        };
        *self.lock() = Some(start);
        start.started_at
    }

    fn clear(&self) {
        *self.lock() = None;
    }

    /// Time since the drive started, if one has
    pub fn elapsed(&self) -> Option<Duration> {
        self.lock().map(|start| start.started.elapsed())
    }

    /// Wall-clock time the drive started
    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.lock().map(|start| start.started_at)
    }
}

/// Wires user intent to the simulator, the signal feed and the state
pub struct DashboardController {
    state: StateHandle,
    engine: SimulationEngine,
    signals: SignalClient,
    mode: DrivingMode,
    clock: DriveClock,
}

impl DashboardController {
    /// Build a controller around injected collaborators.
    ///
    /// `engine` and `signals` should feed the same `state` handle.
    pub fn new(state: StateHandle, engine: SimulationEngine, signals: SignalClient) -> Self {
        Self {
            state,
            engine,
            signals,
            mode: DrivingMode::default(),
            clock: DriveClock::default(),
        }
    }

    /// Set the initial driving mode
    pub fn with_mode(mut self, mode: DrivingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Shared vehicle state
    pub fn state(&self) -> &StateHandle {
        &self.state
    }

    /// Copy of the current vehicle state
    pub fn snapshot(&self) -> VehicleState {
        self.state.snapshot()
    }

    /// Selected driving mode
    pub fn mode(&self) -> DrivingMode {
        self.mode
    }

    /// True while the engine is switched on
    pub fn is_running(&self) -> bool {
        self.state.snapshot().is_running
    }

    /// Simulation engine
    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }

    /// Live signal client
    pub fn signals(&self) -> &SignalClient {
        &self.signals
    }

    /// Handle on the drive clock for render sinks
    pub fn drive_clock(&self) -> DriveClock {
        self.clock.clone()
    }

    /// Start/stop button
    pub fn toggle_engine(&mut self) {
        if self.is_running() {
            self.stop_engine();
        } else {
            self.start_engine();
        }
    }

    /// Mark the engine running and begin simulating. Renders on the first tick.
    fn start_engine(&mut self) {
        self.state
            .apply_silent(&StateUpdate::new().running(true).gear(Gear::Park));
        let started_at = self.clock.begin();
        tracing::info!(mode = %self.mode, %started_at, "Engine started");
        self.engine.start(self.mode);
    }

    /// Halt the simulator, drop to rest in P and render once
    fn stop_engine(&mut self) {
        self.engine.stop();
        self.state.apply(
            &StateUpdate::new()
                .running(false)
                .speed(0.0)
                .rpm(0.0)
                .gear(Gear::Park),
        );
        tracing::info!("Engine stopped");
    }

    /// Reset button: stop, restore power-on defaults and render
    pub fn reset(&mut self) {
        self.stop_engine();
        self.clock.clear();
        self.state.replace(VehicleState::default());
        tracing::info!("Dashboard reset");
    }

    /// Mode selector. Restarts the tick schedule if the engine is running;
    /// accumulated state carries over.
    pub fn set_mode(&mut self, mode: DrivingMode) {
        self.mode = mode;
        tracing::info!(%mode, "Driving mode selected");
        if self.is_running() {
            self.engine.start(mode);
        }
    }

    /// Start the live signal feed
    pub fn connect_signals(&mut self, url: &str) {
        self.signals.connect(url);
    }

    /// Stop the live signal feed
    pub fn disconnect_signals(&mut self) {
        self.signals.disconnect();
    }

    /// Time since the engine was started, while it is running
    pub fn driving_time(&self) -> Option<Duration> {
        if !self.is_running() {
            return None;
        }
        self.clock.elapsed()
    }

    /// Wall-clock time the current drive started
    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.clock.started_at()
    }

    /// Display readout for the current state, including driving time
    pub fn readout(&self) -> Readout {
        Readout::from_state(&self.snapshot()).with_driving_time(self.driving_time())
    }
}
