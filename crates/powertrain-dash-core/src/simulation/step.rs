//! One simulation tick
//!
//! The tick arithmetic is a pure function of the current state, the active
//! profile and a set of random draws, which keeps it checkable without a
//! running timer.

use super::ModeProfile;
use crate::state::{StateUpdate, VehicleState, Warnings};
use rand::Rng;

/// Fraction of the gap to the target closed each tick
pub const SMOOTHING_FACTOR: f64 = 0.1;

/// Chance per tick that the gear changes
pub const GEAR_CHANGE_PROBABILITY: f64 = 0.01;

/// Fuel used per tick while moving (percent)
pub const FUEL_PER_TICK: f64 = 0.001;

/// Odometer advances by `speed / ODOMETER_DIVISOR` per tick while moving.
/// A coarse distance approximation, not derived from the tick period.
pub const ODOMETER_DIVISOR: f64 = 36000.0;

/// Engine heats up above this RPM
pub const HEATING_RPM: f64 = 3000.0;

/// Temperature rise per tick above [`HEATING_RPM`] (°C)
pub const HEAT_PER_TICK: f64 = 0.1;

/// Temperature drop per tick otherwise (°C)
pub const COOL_PER_TICK: f64 = 0.05;

/// Engine does not cool below this temperature (°C)
pub const COOLING_FLOOR: f64 = 85.0;

/// Chance per tick of an oil pressure fault. Redrawn every tick, never latched.
pub const OIL_FAULT_PROBABILITY: f64 = 0.001;

/// Uniform draws in `[0, 1)` consumed by one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickDraws {
    /// Position of the target speed within the profile range
    pub speed: f64,
    /// Position of the target RPM within the profile range
    pub rpm: f64,
    /// Compared against [`GEAR_CHANGE_PROBABILITY`]
    pub gear_change: f64,
    /// Picks the new gear when one is selected
    pub gear_pick: f64,
    /// Compared against [`OIL_FAULT_PROBABILITY`]
    pub oil: f64,
}

impl TickDraws {
    /// Draw a fresh set from `rng`
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            speed: rng.gen(),
            rpm: rng.gen(),
            gear_change: rng.gen(),
            gear_pick: rng.gen(),
            oil: rng.gen(),
        }
    }
}

/// Compute the update for one tick.
///
/// Speed and RPM move [`SMOOTHING_FACTOR`] of the way toward targets drawn
/// from the profile. Fuel, odometer and temperature follow the new values and
/// the warning lamps are derived last.
pub fn advance(state: &VehicleState, profile: &ModeProfile, draws: &TickDraws) -> StateUpdate {
    let target_speed = profile.speed_at(draws.speed);
    let speed = state.speed + (target_speed - state.speed) * SMOOTHING_FACTOR;

    let target_rpm = profile.rpm_at(draws.rpm);
    let rpm = state.rpm + (target_rpm - state.rpm) * SMOOTHING_FACTOR;

    let mut update = StateUpdate::new().speed(speed).rpm(rpm);

    if draws.gear_change < GEAR_CHANGE_PROBABILITY {
        update = update.gear(profile.gear_at(draws.gear_pick));
    }

    let mut fuel_level = state.fuel_level;
    if speed > 0.0 {
        fuel_level -= FUEL_PER_TICK;
        update = update
            .fuel_level(fuel_level)
            .odometer(state.odometer + speed / ODOMETER_DIVISOR);
    }

    let mut engine_temp = state.engine_temp;
    if rpm > HEATING_RPM {
        engine_temp += HEAT_PER_TICK;
    } else if engine_temp > COOLING_FLOOR {
        engine_temp -= COOL_PER_TICK;
    }
    update = update.engine_temp(engine_temp);

    let oil = draws.oil < OIL_FAULT_PROBABILITY;
    update.warnings(Warnings::evaluate(engine_temp, fuel_level, oil))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::DrivingMode;
    use crate::state::Gear;

    const CALM: TickDraws = TickDraws {
        speed: 0.5,
        rpm: 0.5,
        gear_change: 0.5,
        gear_pick: 0.0,
        oil: 0.5,
    };

    fn apply(state: &VehicleState, mode: DrivingMode, draws: &TickDraws) -> VehicleState {
        let mut next = state.clone();
        next.merge(&advance(state, mode.profile(), draws));
        next
    }

    #[test]
    fn test_smoothing_from_rest() {
        let state = VehicleState::default();
        // City target speed at 0.5 is 30 km/h, RPM target 2000
        let next = apply(&state, DrivingMode::City, &CALM);

        assert!((next.speed - 3.0).abs() < 1e-9);
        assert!((next.rpm - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_gear_change_above_threshold() {
        let state = VehicleState::default();
        let update = advance(&state, DrivingMode::Sport.profile(), &CALM);
        assert_eq!(update.get_gear(), None);
    }

    #[test]
    fn test_gear_change_below_threshold() {
        let state = VehicleState::default();
        let draws = TickDraws {
            gear_change: 0.005,
            gear_pick: 0.99,
            ..CALM
        };
        let next = apply(&state, DrivingMode::Highway, &draws);
        assert_eq!(next.gear, Gear::Fifth);
    }

    #[test]
    fn test_fuel_and_odometer_only_while_moving() {
        let state = VehicleState::default();
        // Idle with a zero target keeps the car at rest
        let draws = TickDraws { speed: 0.0, ..CALM };
        let next = apply(&state, DrivingMode::Idle, &draws);
        assert_eq!(next.speed, 0.0);
        assert_eq!(next.fuel_level, state.fuel_level);
        assert_eq!(next.odometer, state.odometer);

        let moving = VehicleState {
            speed: 100.0,
            ..VehicleState::default()
        };
        let next = apply(&moving, DrivingMode::Highway, &CALM);
        assert!((next.fuel_level - (75.0 - FUEL_PER_TICK)).abs() < 1e-12);
        assert!((next.odometer - (12345.0 + next.speed / 36000.0)).abs() < 1e-9);
    }

    #[test]
    fn test_heating_and_cooling() {
        let hot_rpm = VehicleState {
            rpm: 6000.0,
            engine_temp: 90.0,
            ..VehicleState::default()
        };
        let next = apply(&hot_rpm, DrivingMode::Sport, &CALM);
        assert!((next.engine_temp - 90.1).abs() < 1e-9);

        let cruising = VehicleState {
            rpm: 1000.0,
            engine_temp: 90.0,
            ..VehicleState::default()
        };
        let next = apply(&cruising, DrivingMode::Idle, &CALM);
        assert!((next.engine_temp - 89.95).abs() < 1e-9);

        let at_floor = VehicleState {
            rpm: 1000.0,
            engine_temp: 85.0,
            ..VehicleState::default()
        };
        let next = apply(&at_floor, DrivingMode::Idle, &CALM);
        assert_eq!(next.engine_temp, 85.0);
    }

    #[test]
    fn test_warnings_follow_new_values() {
        let state = VehicleState {
            rpm: 7000.0,
            engine_temp: 105.0,
            fuel_level: 10.0005,
            speed: 150.0,
            ..VehicleState::default()
        };
        let next = apply(&state, DrivingMode::Sport, &CALM);

        assert!(next.warnings.engine);
        assert!(next.warnings.battery);
        assert!(!next.warnings.oil);
    }

    #[test]
    fn test_oil_fault_is_redrawn_each_tick() {
        let state = VehicleState::default();
        let faulty = TickDraws { oil: 0.0005, ..CALM };
        let next = apply(&state, DrivingMode::Idle, &faulty);
        assert!(next.warnings.oil);

        let next = apply(&next, DrivingMode::Idle, &CALM);
        assert!(!next.warnings.oil);
    }

    #[test]
    fn test_fuel_may_drift_negative() {
        let state = VehicleState {
            speed: 50.0,
            fuel_level: 0.0,
            ..VehicleState::default()
        };
        let next = apply(&state, DrivingMode::City, &CALM);
        assert!(next.fuel_level < 0.0);
    }
}
