//! Driving-mode profiles

use crate::state::Gear;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error for an unrecognized driving-mode name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown driving mode '{0}' (expected idle, city, highway or sport)")]
pub struct ParseModeError(pub String);

/// Driving mode selected on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrivingMode {
    /// Parked or standing, engine idling
    #[default]
    Idle,
    /// Stop-and-go town driving
    City,
    /// Steady cruising
    Highway,
    /// Full rev range
    Sport,
}

/// Bounds the simulator draws its targets from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeProfile {
    /// Target speed range (km/h), inclusive low, exclusive high
    pub speed_range: (f64, f64),
    /// Target RPM range
    pub rpm_range: (f64, f64),
    /// Gears the simulator may shift into
    pub gears: &'static [Gear],
}

const IDLE: ModeProfile = ModeProfile {
    speed_range: (0.0, 5.0),
    rpm_range: (800.0, 1200.0),
    gears: &[Gear::Park, Gear::Neutral],
};

const CITY: ModeProfile = ModeProfile {
    speed_range: (0.0, 60.0),
    rpm_range: (1000.0, 3000.0),
    gears: &[Gear::First, Gear::Second, Gear::Third, Gear::Drive],
};

const HIGHWAY: ModeProfile = ModeProfile {
    speed_range: (60.0, 120.0),
    rpm_range: (2000.0, 4000.0),
    gears: &[Gear::Drive, Gear::Fourth, Gear::Fifth],
};

const SPORT: ModeProfile = ModeProfile {
    speed_range: (0.0, 200.0),
    rpm_range: (2000.0, 8000.0),
    gears: &[
        Gear::First,
        Gear::Second,
        Gear::Third,
        Gear::Fourth,
        Gear::Fifth,
        Gear::Drive,
    ],
};

impl DrivingMode {
    /// All modes in selector order
    pub const ALL: [DrivingMode; 4] = [
        DrivingMode::Idle,
        DrivingMode::City,
        DrivingMode::Highway,
        DrivingMode::Sport,
    ];

    /// Simulation bounds for this mode
    pub fn profile(self) -> &'static ModeProfile {
        match self {
            DrivingMode::Idle => &IDLE,
            DrivingMode::City => &CITY,
            DrivingMode::Highway => &HIGHWAY,
            DrivingMode::Sport => &SPORT,
        }
    }

    /// Lowercase mode name
    pub fn name(self) -> &'static str {
        match self {
            DrivingMode::Idle => "idle",
            DrivingMode::City => "city",
            DrivingMode::Highway => "highway",
            DrivingMode::Sport => "sport",
        }
    }
}

impl fmt::Display for DrivingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DrivingMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        DrivingMode::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseModeError(trimmed.to_string()))
    }
}

impl ModeProfile {
    /// Value at fraction `u` of the speed range
    pub fn speed_at(&self, u: f64) -> f64 {
        lerp(self.speed_range, u)
    }

    /// Value at fraction `u` of the RPM range
    pub fn rpm_at(&self, u: f64) -> f64 {
        lerp(self.rpm_range, u)
    }

    /// Gear at fraction `u` of the gear set
    pub fn gear_at(&self, u: f64) -> Gear {
        let idx = ((u * self.gears.len() as f64) as usize).min(self.gears.len() - 1);
        self.gears[idx]
    }
}

fn lerp((lo, hi): (f64, f64), u: f64) -> f64 {
    lo + u * (hi - lo)
}
