//! Dashboard configuration
//!
//! Defaults match the cluster's stock behavior; `POWERTRAIN_DASH_*`
//! environment variables override individual fields.

use crate::signal::{DEFAULT_RECONNECT_DELAY, DEFAULT_SIGNAL_URL};
use crate::simulation::{DrivingMode, ParseModeError, DEFAULT_TICK_INTERVAL};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Prefix shared by every configuration variable
pub const ENV_PREFIX: &str = "POWERTRAIN_DASH_";

/// Errors from reading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An environment variable could not be parsed
    #[error("Invalid value for {key}: '{value}' ({message})")]
    InvalidValue {
        /// Full variable name
        key: String,
        /// Value as read
        value: String,
        /// Why it was rejected
        message: String,
    },

    /// Unknown driving mode name
    #[error(transparent)]
    Mode(#[from] ParseModeError),
}

/// Runtime configuration for the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Signal server address
    pub signal_url: String,
    /// Connect to the signal server on startup
    pub auto_connect: bool,
    /// Simulation tick period (ms)
    pub tick_interval_ms: u64,
    /// Delay before each reconnect attempt (ms)
    pub reconnect_delay_ms: u64,
    /// Driving mode selected at startup
    pub initial_mode: DrivingMode,
    /// Fixed simulator seed; entropy when unset
    pub seed: Option<u64>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            signal_url: DEFAULT_SIGNAL_URL.to_string(),
            auto_connect: false,
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY.as_millis() as u64,
            initial_mode: DrivingMode::default(),
            seed: None,
        }
    }
}

impl DashboardConfig {
    /// Defaults overlaid with the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`, keyed by full variable name
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |name: &str| {
            let key = format!("{ENV_PREFIX}{name}");
            lookup(&key).map(|value| (key, value.trim().to_string()))
        };

        if let Some((_, url)) = get("SIGNAL_URL") {
            if !url.is_empty() {
                config.signal_url = url;
            }
        }
        if let Some((key, value)) = get("AUTO_CONNECT") {
            config.auto_connect = parse_bool(&key, &value)?;
        }
        if let Some((key, value)) = get("TICK_INTERVAL_MS") {
            config.tick_interval_ms = parse_millis(&key, &value)?;
        }
        if let Some((key, value)) = get("RECONNECT_DELAY_MS") {
            config.reconnect_delay_ms = parse_millis(&key, &value)?;
        }
        if let Some((_, value)) = get("MODE") {
            config.initial_mode = value.parse()?;
        }
        if let Some((key, value)) = get("SEED") {
            config.seed = Some(value.parse().map_err(|e: std::num::ParseIntError| {
                invalid(&key, &value, e.to_string())
            })?);
        }

        Ok(config)
    }

    /// Simulation tick period
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Delay before each reconnect attempt
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

fn invalid(key: &str, value: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        message: message.into(),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value, "expected true or false")),
    }
}

fn parse_millis(key: &str, value: &str) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(0) => Err(invalid(key, value, "must be greater than zero")),
        Ok(ms) => Ok(ms),
        Err(e) => Err(invalid(key, value, e.to_string())),
    }
}
