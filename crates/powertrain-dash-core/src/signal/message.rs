//! Signal message format and mapping onto vehicle state
//!
//! Wire format, one JSON object per frame:
//!
//! ```json
//! { "messageId": "EngineData", "signals": { "EngSpeed": 2400, "EngTemp": 91.5 } }
//! ```

use super::SignalError;
use crate::state::{Gear, StateUpdate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Engine speed, in `EngineData`
pub const SIGNAL_ENGINE_SPEED: &str = "EngSpeed";
/// Coolant temperature, in `EngineData`
pub const SIGNAL_ENGINE_TEMP: &str = "EngTemp";
/// Fuel level, in `EngineData`
pub const SIGNAL_PETROL_LEVEL: &str = "PetrolLevel";
/// Road speed, in `ABSdata`
pub const SIGNAL_CAR_SPEED: &str = "CarSpeed";
/// Gearbox code, in `GearBoxInfo`
pub const SIGNAL_GEAR: &str = "Gear";

/// One decoded message from the signal feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalMessage {
    /// Message name, e.g. `EngineData`
    pub message_id: String,
    /// Signal values by name
    pub signals: HashMap<String, f64>,
}

/// Message ids the dashboard understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Engine speed, coolant temperature and fuel level
    EngineData,
    /// Road speed (`ABSdata`)
    AbsData,
    /// Selected gear code
    GearBoxInfo,
}

impl MessageKind {
    /// Look up a message id
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "EngineData" => Some(MessageKind::EngineData),
            "ABSdata" => Some(MessageKind::AbsData),
            "GearBoxInfo" => Some(MessageKind::GearBoxInfo),
            _ => None,
        }
    }
}

impl SignalMessage {
    /// Message with no signals
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            signals: HashMap::new(),
        }
    }

    /// Add a signal value
    pub fn with_signal(mut self, name: impl Into<String>, value: f64) -> Self {
        self.signals.insert(name.into(), value);
        self
    }

    /// Decode one JSON text frame
    pub fn decode(text: &str) -> Result<Self, SignalError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Known message kind, if any
    pub fn kind(&self) -> Option<MessageKind> {
        MessageKind::from_id(&self.message_id)
    }

    fn signal(&self, name: &str) -> Option<f64> {
        self.signals.get(name).copied()
    }

    /// Map the message's signals onto a state update.
    ///
    /// Only signals present in the message are mapped. Unknown message ids
    /// and unrelated signals yield an empty update.
    pub fn to_update(&self) -> StateUpdate {
        let mut update = StateUpdate::new();

        match self.kind() {
            Some(MessageKind::EngineData) => {
                if let Some(rpm) = self.signal(SIGNAL_ENGINE_SPEED) {
                    update = update.rpm(rpm);
                }
                if let Some(temp) = self.signal(SIGNAL_ENGINE_TEMP) {
                    update = update.engine_temp(temp);
                }
                if let Some(level) = self.signal(SIGNAL_PETROL_LEVEL) {
                    update = update.fuel_level(level);
                }
            }
            Some(MessageKind::AbsData) => {
                if let Some(speed) = self.signal(SIGNAL_CAR_SPEED) {
                    update = update.speed(speed);
                }
            }
            Some(MessageKind::GearBoxInfo) => {
                if let Some(code) = self.signal(SIGNAL_GEAR) {
                    update = update.gear(Gear::from_code(code));
                }
            }
            None => {}
        }

        update
    }
}
