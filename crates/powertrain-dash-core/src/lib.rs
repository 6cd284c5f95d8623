//! # Powertrain Dash Core Library
//!
//! Data pipeline behind the powertrain instrument cluster.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - The vehicle state record with multi-subscriber change notification
//! - A random-drive simulator with per-mode profiles
//! - A reconnecting WebSocket client for pre-decoded vehicle signals
//! - The controller behind the cluster's start/stop, reset and mode controls
//! - Display readout derivation for render sinks
//!
//! ## Example
//!
//! ```rust,ignore
//! use powertrain_dash_core::prelude::*;
//!
//! let state = StateHandle::default();
//! state.subscribe(|s: &VehicleState| println!("{} km/h", s.speed.round()));
//!
//! let engine = SimulationEngine::new(state.clone());
//! let signals = SignalClient::new(state.clone());
//! let mut dashboard = DashboardController::new(state, engine, signals);
//!
//! dashboard.set_mode(DrivingMode::City);
//! dashboard.toggle_engine();
//! ```

pub mod config;
pub mod controller;
pub mod render;
pub mod signal;
pub mod simulation;
pub mod state;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::DashboardConfig;
    pub use crate::controller::{DashboardController, DriveClock};
    pub use crate::render::{Readout, RenderSink};
    pub use crate::signal::{ConnectionState, SignalClient, SignalMessage};
    pub use crate::simulation::{DrivingMode, SimulationEngine};
    pub use crate::state::{Gear, StateHandle, StateUpdate, VehicleState, Warnings};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
