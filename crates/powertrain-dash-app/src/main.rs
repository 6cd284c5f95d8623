//! Powertrain dashboard, terminal edition
//!
//! Builds the state pipeline, renders it to the terminal and maps stdin
//! commands onto the dashboard controls. Configuration comes from
//! `POWERTRAIN_DASH_*` environment variables, log filtering from `RUST_LOG`.

mod commands;
mod console;

use anyhow::{Context, Result};
use commands::{Command, HELP};
use console::{full_readout, ConsoleRenderer, TracingRenderer};
use powertrain_dash_core::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = DashboardConfig::from_env().context("Invalid dashboard configuration")?;
    tracing::info!(
        version = powertrain_dash_core::VERSION,
        mode = %config.initial_mode,
        signal_url = %config.signal_url,
        "Powertrain dashboard starting"
    );

    let mut dashboard = build_dashboard(&config);
    if config.auto_connect {
        dashboard.connect_signals(&config.signal_url);
    }
    dashboard.state().refresh();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match Command::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => execute(&mut dashboard, command, &config),
                    Err(e) => eprintln!("{e}"),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    dashboard.disconnect_signals();
    if dashboard.is_running() {
        dashboard.toggle_engine();
    }
    println!();
    tracing::info!("Powertrain dashboard stopped");
    Ok(())
}

/// Wire the state, simulator and signal client into a controller
fn build_dashboard(config: &DashboardConfig) -> DashboardController {
    let state = StateHandle::default();

    let engine = match config.seed {
        Some(seed) => SimulationEngine::with_seed(state.clone(), seed),
        None => SimulationEngine::new(state.clone()),
    }
    .with_tick_interval(config.tick_interval());

    let signals =
        SignalClient::new(state.clone()).with_reconnect_delay(config.reconnect_delay());

    let dashboard =
        DashboardController::new(state.clone(), engine, signals).with_mode(config.initial_mode);
    state.subscribe(ConsoleRenderer::new(dashboard.drive_clock()));
    state.subscribe(TracingRenderer);
    dashboard
}

fn execute(dashboard: &mut DashboardController, command: Command, config: &DashboardConfig) {
    match command {
        Command::Toggle => dashboard.toggle_engine(),
        Command::Reset => dashboard.reset(),
        Command::Mode(mode) => dashboard.set_mode(mode),
        Command::Connect(url) => {
            dashboard.connect_signals(url.as_deref().unwrap_or(config.signal_url.as_str()))
        }
        Command::Disconnect => dashboard.disconnect_signals(),
        Command::Status => {
            let signals = dashboard.signals();
            let stats = signals.stats();
            let pending = if signals.reconnect_pending() {
                ", reconnect pending"
            } else {
                ""
            };
            println!("\n{}", full_readout(&dashboard.readout()));
            println!(
                "mode         {} (tick {:?})",
                dashboard.mode(),
                dashboard.engine().tick_interval()
            );
            println!(
                "signals      {:?}{pending} ({} applied, {} ignored, {} bad, retry every {:?})",
                signals.connection_state(),
                stats.applied,
                stats.ignored,
                stats.decode_errors,
                signals.reconnect_delay(),
            );
        }
        Command::Help => println!("\n{HELP}"),
        Command::Quit => {}
    }
}
