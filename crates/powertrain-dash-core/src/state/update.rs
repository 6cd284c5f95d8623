//! Partial state updates

use super::{Gear, Warnings};

/// A set of field writes to merge into [`super::VehicleState`].
///
/// Unset fields are left untouched by the merge. Warning lamps are derived
/// values, so only the simulator inside this crate may set them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub(crate) speed: Option<f64>,
    pub(crate) rpm: Option<f64>,
    pub(crate) gear: Option<Gear>,
    pub(crate) fuel_level: Option<f64>,
    pub(crate) engine_temp: Option<f64>,
    pub(crate) is_running: Option<bool>,
    pub(crate) warnings: Option<Warnings>,
    pub(crate) odometer: Option<f64>,
    pub(crate) fuel_consumption: Option<f64>,
}

impl StateUpdate {
    /// Create an empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the road speed
    pub fn speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Set the engine speed
    pub fn rpm(mut self, rpm: f64) -> Self {
        self.rpm = Some(rpm);
        self
    }

    /// Set the gear
    pub fn gear(mut self, gear: Gear) -> Self {
        self.gear = Some(gear);
        self
    }

    /// Set the fuel level
    pub fn fuel_level(mut self, fuel_level: f64) -> Self {
        self.fuel_level = Some(fuel_level);
        self
    }

    /// Set the coolant temperature
    pub fn engine_temp(mut self, engine_temp: f64) -> Self {
        self.engine_temp = Some(engine_temp);
        self
    }

    /// Set the engine running flag
    pub fn running(mut self, is_running: bool) -> Self {
        self.is_running = Some(is_running);
        self
    }

    /// Set the odometer
    pub fn odometer(mut self, odometer: f64) -> Self {
        self.odometer = Some(odometer);
        self
    }

    /// Set the consumption figure
    pub fn fuel_consumption(mut self, fuel_consumption: f64) -> Self {
        self.fuel_consumption = Some(fuel_consumption);
        self
    }

    pub(crate) fn warnings(mut self, warnings: Warnings) -> Self {
        self.warnings = Some(warnings);
        self
    }

    /// True if the update would not write any field
    pub fn is_empty(&self) -> bool {
        self.speed.is_none()
            && self.rpm.is_none()
            && self.gear.is_none()
            && self.fuel_level.is_none()
            && self.engine_temp.is_none()
            && self.is_running.is_none()
            && self.warnings.is_none()
            && self.odometer.is_none()
            && self.fuel_consumption.is_none()
    }

    /// Number of fields the update writes
    pub fn len(&self) -> usize {
        [
            self.speed.is_some(),
            self.rpm.is_some(),
            self.gear.is_some(),
            self.fuel_level.is_some(),
            self.engine_temp.is_some(),
            self.is_running.is_some(),
            self.warnings.is_some(),
            self.odometer.is_some(),
            self.fuel_consumption.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }

    /// Speed to be written, if set
    pub fn get_speed(&self) -> Option<f64> {
        self.speed
    }

    /// RPM to be written, if set
    pub fn get_rpm(&self) -> Option<f64> {
        self.rpm
    }

    /// Gear to be written, if set
    pub fn get_gear(&self) -> Option<Gear> {
        self.gear
    }

    /// Fuel level to be written, if set
    pub fn get_fuel_level(&self) -> Option<f64> {
        self.fuel_level
    }

    /// Temperature to be written, if set
    pub fn get_engine_temp(&self) -> Option<f64> {
        self.engine_temp
    }
}

#[cfg(test)]
mod tests {
    use super::super::VehicleState;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_update() {
        let update = StateUpdate::new();
        assert!(update.is_empty());
        assert_eq!(update.len(), 0);
    }

    #[test]
    fn test_merge_leaves_unset_fields() {
        let mut state = VehicleState::new();
        let before = state.clone();

        state.merge(&StateUpdate::new().speed(42.0));

        assert_eq!(state.speed, 42.0);
        assert_eq!(
            VehicleState {
                speed: before.speed,
                ..state.clone()
            },
            before
        );
    }

    #[test]
    fn test_merge_last_write_wins() {
        let mut state = VehicleState::new();
        state.merge(&StateUpdate::new().rpm(900.0).gear(Gear::Drive));
        state.merge(&StateUpdate::new().rpm(2500.0));

        assert_eq!(state.rpm, 2500.0);
        assert_eq!(state.gear, Gear::Drive);
    }

    #[test]
    fn test_merge_does_not_clamp() {
        let mut state = VehicleState::new();
        state.merge(&StateUpdate::new().fuel_level(-3.5).speed(-1.0));

        assert_eq!(state.fuel_level, -3.5);
        assert_eq!(state.speed, -1.0);
    }
}
