//! Render Sink
//!
//! The display side of the pipeline. A sink receives every state change;
//! [`Readout`] derives what each widget shows from a state snapshot.

use crate::state::{Gear, VehicleState};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Full-scale speedometer reading (km/h)
pub const SPEED_GAUGE_MAX: f64 = 300.0;

/// Full-scale tachometer reading
pub const RPM_GAUGE_MAX: f64 = 10000.0;

/// Tachometer red line
pub const RPM_RED_LINE: f64 = 8000.0;

/// Consumer of state notifications.
///
/// Called synchronously after every mutation, so implementations should be
/// idempotent and quick, with no side effects beyond the display.
pub trait RenderSink: Send + Sync {
    /// Redraw from the post-update state
    fn render(&self, state: &VehicleState);
}

impl<F> RenderSink for F
where
    F: Fn(&VehicleState) + Send + Sync,
{
    fn render(&self, state: &VehicleState) {
        self(state)
    }
}

/// Color class of the gear indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GearTone {
    /// P or N
    Neutral,
    /// R
    Reverse,
    /// Any forward gear
    Drive,
}

/// Fill band of the fuel bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelBand {
    /// Below 20%
    Low,
    /// Below 50%
    Medium,
    /// 50% and above
    High,
}

/// Temperature gauge status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TempStatus {
    /// Below 60 °C
    Cold,
    /// 60 to 100 °C
    Normal,
    /// Above 100 °C
    Overheat,
}

/// Everything the cluster widgets display for one state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Readout {
    /// Rounded speed (km/h)
    pub speed: i64,
    /// Needle rotation in degrees, -90 at zero and +90 at full scale
    pub speed_needle_deg: f64,
    /// Rounded engine speed
    pub rpm: i64,
    /// Tachometer needle rotation in degrees
    pub rpm_needle_deg: f64,
    /// Gear indicator label
    pub gear: String,
    /// Gear indicator color class
    pub gear_tone: GearTone,
    /// Fuel bar width (percent, unclamped)
    pub fuel_width: f64,
    /// Rounded fuel level (percent)
    pub fuel_percent: i64,
    /// Fuel bar color band
    pub fuel_band: FuelBand,
    /// Rounded coolant temperature (°C)
    pub engine_temp: i64,
    /// Temperature gauge status
    pub temp_status: TempStatus,
    /// Lit warning lamps by name
    pub warnings: Vec<&'static str>,
    /// Odometer text, e.g. `12,345 km`
    pub odometer: String,
    /// Consumption text, e.g. `7.2 L/100km`
    pub fuel_consumption: String,
    /// Only present while the engine is running
    pub driving_time: Option<String>,
}

impl Readout {
    /// Derive the readout for a state
    pub fn from_state(state: &VehicleState) -> Self {
        let mut warnings = Vec::new();
        if state.warnings.engine {
            warnings.push("engine");
        }
        if state.warnings.oil {
            warnings.push("oil");
        }
        if state.warnings.battery {
            warnings.push("battery");
        }

        Self {
            speed: state.speed.round() as i64,
            speed_needle_deg: needle_angle(state.speed, SPEED_GAUGE_MAX),
            rpm: state.rpm.round() as i64,
            rpm_needle_deg: needle_angle(state.rpm, RPM_GAUGE_MAX),
            gear: state.gear.label().to_string(),
            gear_tone: gear_tone(state.gear),
            fuel_width: state.fuel_level,
            fuel_percent: state.fuel_level.round() as i64,
            fuel_band: fuel_band(state.fuel_level),
            engine_temp: state.engine_temp.round() as i64,
            temp_status: temp_status(state.engine_temp),
            warnings,
            odometer: format!("{} km", format_thousands(state.odometer)),
            fuel_consumption: format!("{:.1} L/100km", state.fuel_consumption),
            driving_time: None,
        }
    }

    /// Attach the elapsed driving time
    pub fn with_driving_time(mut self, elapsed: Option<Duration>) -> Self {
        self.driving_time = elapsed.map(format_driving_time);
        self
    }
}

/// Needle rotation for a half-circle gauge
pub fn needle_angle(value: f64, full_scale: f64) -> f64 {
    (value / full_scale) * 180.0 - 90.0
}

/// Color class for a gear
pub fn gear_tone(gear: Gear) -> GearTone {
    match gear {
        Gear::Park | Gear::Neutral => GearTone::Neutral,
        Gear::Reverse => GearTone::Reverse,
        _ => GearTone::Drive,
    }
}

/// Fuel bar band for a level
pub fn fuel_band(fuel_level: f64) -> FuelBand {
    if fuel_level < 20.0 {
        FuelBand::Low
    } else if fuel_level < 50.0 {
        FuelBand::Medium
    } else {
        FuelBand::High
    }
}

/// Gauge status for a temperature
pub fn temp_status(engine_temp: f64) -> TempStatus {
    if engine_temp < 60.0 {
        TempStatus::Cold
    } else if engine_temp > 100.0 {
        TempStatus::Overheat
    } else {
        TempStatus::Normal
    }
}

/// Format an elapsed duration as `HH:MM:SS`
pub fn format_driving_time(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

/// Group the integer part in thousands, keeping up to three decimals
pub fn format_thousands(value: f64) -> String {
    let rounded = format!("{:.3}", value.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let frac = frac_part.trim_end_matches('0');
    let sign = if value < 0.0 && rounded.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };

    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}
