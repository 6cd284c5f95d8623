//! Terminal render sinks

use powertrain_dash_core::controller::DriveClock;
use powertrain_dash_core::render::{FuelBand, Readout, RenderSink, TempStatus, RPM_RED_LINE};
use powertrain_dash_core::state::VehicleState;
use std::io::{self, Write};

/// Redraws a one-line cluster on stdout
#[derive(Debug, Clone, Default)]
pub struct ConsoleRenderer {
    clock: DriveClock,
}

impl ConsoleRenderer {
    /// Renderer that shows the driving time from `clock` while running
    pub fn new(clock: DriveClock) -> Self {
        Self { clock }
    }

    /// Status line for a state
    pub fn line(&self, state: &VehicleState) -> String {
        let driving_time = if state.is_running {
            self.clock.elapsed()
        } else {
            None
        };
        let readout = Readout::from_state(state).with_driving_time(driving_time);
        status_line(&readout, state.rpm >= RPM_RED_LINE)
    }
}

impl RenderSink for ConsoleRenderer {
    fn render(&self, state: &VehicleState) {
        let line = self.line(state);
        let mut out = io::stdout().lock();
        // A closed stdout only loses the display
        let _ = write!(out, "\r\x1b[2K{line}");
        let _ = out.flush();
    }
}

/// Logs every readout as JSON at trace level
#[derive(Debug, Default)]
pub struct TracingRenderer;

impl RenderSink for TracingRenderer {
    fn render(&self, state: &VehicleState) {
        if !tracing::enabled!(tracing::Level::TRACE) {
            return;
        }
        match serde_json::to_string(&Readout::from_state(state)) {
            Ok(json) => tracing::trace!(readout = %json, "Render"),
            Err(e) => tracing::warn!(error = %e, "Failed to serialize readout"),
        }
    }
}

/// Compact single-line rendering of a readout
pub fn status_line(readout: &Readout, red_line: bool) -> String {
    let rpm_mark = if red_line { "!" } else { "" };
    let fuel_mark = match readout.fuel_band {
        FuelBand::Low => " LOW",
        FuelBand::Medium | FuelBand::High => "",
    };
    let temp = match readout.temp_status {
        TempStatus::Cold => "cold",
        TempStatus::Normal => "ok",
        TempStatus::Overheat => "HOT",
    };
    let lamps = if readout.warnings.is_empty() {
        "-".to_string()
    } else {
        readout.warnings.join(",")
    };

    let mut line = format!(
        "{:>3} km/h | {:>4} rpm{} | [{}] | fuel {:>3}%{} | {:>3}°C {} | lamps {} | {} | {}",
        readout.speed,
        readout.rpm,
        rpm_mark,
        readout.gear,
        readout.fuel_percent,
        fuel_mark,
        readout.engine_temp,
        temp,
        lamps,
        readout.odometer,
        readout.fuel_consumption,
    );
    if let Some(time) = &readout.driving_time {
        line.push_str(" | ");
        line.push_str(time);
    }
    line
}

/// Multi-line readout for the `status` command
pub fn full_readout(readout: &Readout) -> String {
    let lamps = if readout.warnings.is_empty() {
        "none".to_string()
    } else {
        readout.warnings.join(", ")
    };
    format!(
        "speed        {} km/h (needle {:.1}°)\n\
         rpm          {} (needle {:.1}°)\n\
         gear         {} ({:?})\n\
         fuel         {}% ({:?})\n\
         temperature  {}°C ({:?})\n\
         warnings     {}\n\
         odometer     {}\n\
         consumption  {}\n\
         driving time {}",
        readout.speed,
        readout.speed_needle_deg,
        readout.rpm,
        readout.rpm_needle_deg,
        readout.gear,
        readout.gear_tone,
        readout.fuel_percent,
        readout.fuel_band,
        readout.engine_temp,
        readout.temp_status,
        lamps,
        readout.odometer,
        readout.fuel_consumption,
        readout.driving_time.as_deref().unwrap_or("--:--:--"),
    )
}
