//! Drive Simulator
//!
//! Generates plausible cluster data without a vehicle connection. Each tick
//! draws random speed and RPM targets from the active driving-mode profile
//! and eases the state toward them, with fuel burn, odometer, engine
//! temperature and warning lamps following along.

mod engine;
mod profile;
pub mod step;

pub use engine::{SimulationEngine, DEFAULT_TICK_INTERVAL};
pub use profile::{DrivingMode, ModeProfile, ParseModeError};
pub use step::TickDraws;
