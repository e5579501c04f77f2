//! Engine binary for the Foodchain simulation.
//!
//! Loads configuration, builds the world, spawns the initial population and
//! runs the fixed-step loop until the tick limit, extinction, or Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `foodchain-config.yaml` (or `FOODCHAIN_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Build clock, terrain, world and player
//! 4. Spawn the initial population
//! 5. Create run control and install the shutdown signal handler
//! 6. Run the simulation loop
//! 7. Log the result and print it as JSON

mod census;
mod error;

use std::path::PathBuf;
use std::sync::Arc;

use foodchain_core::config::LoggingConfig;
use foodchain_core::{RunControl, SimulationConfig, SimulationState, runner};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::census::{CensusCallback, RunTotals};
use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "foodchain-config.yaml";

/// Everything printed when the run ends.
#[derive(Debug, Serialize)]
struct FinalReport<'a> {
    result: &'a runner::SimulationResult,
    totals: &'a RunTotals,
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("foodchain-engine starting");
    info!(
        source = %source,
        seed = config.world.seed,
        tick_secs = config.world.tick_secs,
        tick_interval_ms = config.world.tick_interval_ms,
        max_ticks = config.world.max_ticks,
        "Configuration loaded"
    );

    // 3. Build clock, terrain, world and player.
    let mut state = SimulationState::new(config).map_err(EngineError::from)?;
    info!(
        half_extent = state.world.terrain().half_extent(),
        obstacles = state.world.terrain().obstacles().len(),
        player = state.world.player().is_some(),
        "World created"
    );

    // 4. Spawn the initial population.
    let spawned = state.populate().map_err(EngineError::from)?;
    info!(agents = spawned, "Initial population ready");

    // 5. Run control and shutdown signal.
    let control = Arc::new(RunControl::new(
        state.config.world.tick_interval_ms,
        state.config.world.max_ticks,
    ));
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
                control.request_stop();
            }
        });
    }

    // 6. Run the simulation.
    let mut callback = CensusCallback::new(state.config.logging.census_interval_ticks);
    let result = runner::run_simulation(&mut state, &control, &mut callback)
        .await
        .map_err(EngineError::from)?;

    // 7. Log and print the result.
    runner::log_simulation_end(&result);
    let report = FinalReport {
        result: &result,
        totals: callback.totals(),
    };
    let json = serde_json::to_string_pretty(&report).map_err(EngineError::from)?;
    println!("{json}");

    info!(end_reason = ?result.end_reason, total_ticks = result.total_ticks, "foodchain-engine shutdown complete");
    Ok(())
}

/// Install the tracing subscriber. `RUST_LOG` overrides the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Load the simulation configuration.
///
/// Reads `FOODCHAIN_CONFIG` if set, otherwise `foodchain-config.yaml` in
/// the working directory. A missing default file means defaults; a missing
/// explicitly named file is an error. Returns the config and a description
/// of where it came from.
fn load_config() -> Result<(SimulationConfig, String), EngineError> {
    if let Some(path) = std::env::var_os("FOODCHAIN_CONFIG").map(PathBuf::from) {
        let config = SimulationConfig::from_file(&path)?;
        return Ok((config, path.display().to_string()));
    }
    let path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if path.exists() {
        let config = SimulationConfig::from_file(&path)?;
        Ok((config, path.display().to_string()))
    } else {
        Ok((SimulationConfig::default(), String::from("defaults")))
    }
}
