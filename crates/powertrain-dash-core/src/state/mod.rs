//! Vehicle State
//!
//! The single mutable record behind the instrument cluster, the partial
//! updates producers apply to it, and the shared handle that fans every
//! change out to the render sinks.

mod handle;
mod update;

pub use handle::{StateHandle, SubscriptionId};
pub use update::StateUpdate;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default fuel level (percent) for a fresh state
pub const DEFAULT_FUEL_LEVEL: f64 = 75.0;

/// Default engine temperature (°C) for a fresh state
pub const DEFAULT_ENGINE_TEMP: f64 = 85.0;

/// Default odometer reading (km) for a fresh state
pub const DEFAULT_ODOMETER: f64 = 12345.0;

/// Fuel consumption placeholder (L/100km). Never recomputed from odometer or fuel delta.
pub const DEFAULT_FUEL_CONSUMPTION: f64 = 7.2;

/// Engine warning lights above this temperature (strictly greater)
pub const ENGINE_TEMP_WARNING: f64 = 105.0;

/// Battery warning lights below this fuel level (strictly less)
pub const LOW_FUEL_WARNING: f64 = 10.0;

/// Gear selector position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Gear {
    /// Park
    #[default]
    #[serde(rename = "P")]
    Park,
    /// Neutral
    #[serde(rename = "N")]
    Neutral,
    /// Reverse
    #[serde(rename = "R")]
    Reverse,
    /// Drive
    #[serde(rename = "D")]
    Drive,
    /// First
    #[serde(rename = "1")]
    First,
    /// Second
    #[serde(rename = "2")]
    Second,
    /// Third
    #[serde(rename = "3")]
    Third,
    /// Fourth
    #[serde(rename = "4")]
    Fourth,
    /// Fifth
    #[serde(rename = "5")]
    Fifth,
    /// Sixth
    #[serde(rename = "6")]
    Sixth,
}

impl Gear {
    /// Label shown on the gear indicator
    pub fn label(self) -> &'static str {
        match self {
            Gear::Park => "P",
            Gear::Neutral => "N",
            Gear::Reverse => "R",
            Gear::Drive => "D",
            Gear::First => "1",
            Gear::Second => "2",
            Gear::Third => "3",
            Gear::Fourth => "4",
            Gear::Fifth => "5",
            Gear::Sixth => "6",
        }
    }

    /// Map a gearbox code from the signal feed to a gear.
    ///
    /// Codes 0-9 follow the gearbox convention (0 = P, 1-6 = forward gears,
    /// 7 = R, 8 = N, 9 = D). Anything else, including non-integral values,
    /// falls back to `P`.
    pub fn from_code(code: f64) -> Gear {
        if code.fract() != 0.0 {
            return Gear::Park;
        }
        match code as i64 {
            0 => Gear::Park,
            1 => Gear::First,
            2 => Gear::Second,
            3 => Gear::Third,
            4 => Gear::Fourth,
            5 => Gear::Fifth,
            6 => Gear::Sixth,
            7 => Gear::Reverse,
            8 => Gear::Neutral,
            9 => Gear::Drive,
            _ => Gear::Park,
        }
    }
}

impl fmt::Display for Gear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Warning lamp states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Warnings {
    /// Engine temperature above the warning threshold
    pub engine: bool,
    /// Oil pressure fault
    pub oil: bool,
    /// Low fuel (shown on the battery lamp)
    pub battery: bool,
}

impl Warnings {
    /// Derive the threshold lamps from temperature and fuel level.
    ///
    /// `oil` is not a threshold lamp; the caller supplies it.
    pub fn evaluate(engine_temp: f64, fuel_level: f64, oil: bool) -> Self {
        Self {
            engine: engine_temp > ENGINE_TEMP_WARNING,
            oil,
            battery: fuel_level < LOW_FUEL_WARNING,
        }
    }

    /// True if any lamp is lit
    pub fn any(&self) -> bool {
        self.engine || self.oil || self.battery
    }
}

/// Snapshot of everything the cluster displays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleState {
    /// Road speed (km/h)
    pub speed: f64,
    /// Engine speed
    pub rpm: f64,
    /// Gear selector position
    pub gear: Gear,
    /// Fuel level (percent). Not clamped; continuous consumption can take it below zero.
    pub fuel_level: f64,
    /// Coolant temperature (°C)
    pub engine_temp: f64,
    /// Engine switched on
    pub is_running: bool,
    /// Warning lamps
    pub warnings: Warnings,
    /// Total distance (km)
    pub odometer: f64,
    /// Fuel consumption (L/100km), a static figure
    pub fuel_consumption: f64,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            speed: 0.0,
            rpm: 0.0,
            gear: Gear::Park,
            fuel_level: DEFAULT_FUEL_LEVEL,
            engine_temp: DEFAULT_ENGINE_TEMP,
            is_running: false,
            warnings: Warnings::default(),
            odometer: DEFAULT_ODOMETER,
            fuel_consumption: DEFAULT_FUEL_CONSUMPTION,
        }
    }
}

impl VehicleState {
    /// Create a state with the power-on defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a partial update into this state.
    ///
    /// Only the fields set on `update` are written; no validation or clamping
    /// is performed.
    pub fn merge(&mut self, update: &StateUpdate) {
        if let Some(speed) = update.speed {
            self.speed = speed;
        }
        if let Some(rpm) = update.rpm {
            self.rpm = rpm;
        }
        if let Some(gear) = update.gear {
            self.gear = gear;
        }
        if let Some(fuel_level) = update.fuel_level {
            self.fuel_level = fuel_level;
        }
        if let Some(engine_temp) = update.engine_temp {
            self.engine_temp = engine_temp;
        }
        if let Some(is_running) = update.is_running {
            self.is_running = is_running;
        }
        if let Some(warnings) = update.warnings {
            self.warnings = warnings;
        }
        if let Some(odometer) = update.odometer {
            self.odometer = odometer;
        }
        if let Some(fuel_consumption) = update.fuel_consumption {
            self.fuel_consumption = fuel_consumption;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = VehicleState::new();
        assert_eq!(state.speed, 0.0);
        assert_eq!(state.rpm, 0.0);
        assert_eq!(state.gear, Gear::Park);
        assert_eq!(state.fuel_level, 75.0);
        assert_eq!(state.engine_temp, 85.0);
        assert_eq!(state.odometer, 12345.0);
        assert_eq!(state.fuel_consumption, 7.2);
        assert!(!state.is_running);
        assert!(!state.warnings.any());
    }

    #[test]
    fn test_gear_codes() {
        assert_eq!(Gear::from_code(0.0), Gear::Park);
        assert_eq!(Gear::from_code(3.0), Gear::Third);
        assert_eq!(Gear::from_code(6.0), Gear::Sixth);
        assert_eq!(Gear::from_code(7.0), Gear::Reverse);
        assert_eq!(Gear::from_code(8.0), Gear::Neutral);
        assert_eq!(Gear::from_code(9.0), Gear::Drive);
        assert_eq!(Gear::from_code(99.0), Gear::Park);
        assert_eq!(Gear::from_code(-1.0), Gear::Park);
        assert_eq!(Gear::from_code(2.5), Gear::Park);
        assert_eq!(Gear::from_code(f64::NAN), Gear::Park);
    }

    #[test]
    fn test_engine_warning_boundary() {
        assert!(!Warnings::evaluate(105.0, 50.0, false).engine);
        assert!(Warnings::evaluate(105.01, 50.0, false).engine);
    }

    #[test]
    fn test_battery_warning_boundary() {
        assert!(!Warnings::evaluate(85.0, 10.0, false).battery);
        assert!(Warnings::evaluate(85.0, 9.99, false).battery);
    }

    #[test]
    fn test_gear_serializes_as_label() {
        let json = serde_json::to_string(&Gear::Reverse).unwrap();
        assert_eq!(json, "\"R\"");
        let gear: Gear = serde_json::from_str("\"4\"").unwrap();
        assert_eq!(gear, Gear::Fourth);
    }

    #[test]
    fn test_state_json_field_names() {
        let json = serde_json::to_value(VehicleState::new()).unwrap();
        assert_eq!(json["fuelLevel"], 75.0);
        assert_eq!(json["engineTemp"], 85.0);
        assert_eq!(json["isRunning"], false);
        assert_eq!(json["gear"], "P");
    }
}
