//! Simulation binary for the Airgrid airspace allocator.
//!
//! Wires together the grid environment, owner population, slot
//! allocator, renderer, and statistics. Loads configuration, runs the
//! tick loop to the configured horizon, and prints the end-of-run
//! report.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `airgrid-config.yaml` (defaults if absent)
//! 3. Assemble the simulation (grid, owners, allocator)
//! 4. Run the tick loop
//! 5. Print the statistics report

mod config;
mod error;
mod render;
mod sim;
mod spawner;
mod stats;

use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::SimulationConfig;
use crate::sim::Simulation;

/// Default configuration file path, relative to the working directory.
const CONFIG_PATH: &str = "airgrid-config.yaml";

/// Application entry point for the simulation binary.
///
/// # Errors
///
/// Returns an error if configuration loading, simulation assembly, or
/// the run itself fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("airgrid-engine starting");

    let config = load_config()?;
    info!(
        world = config.world.name,
        seed = config.world.seed,
        max_ticks = config.world.max_ticks,
        owners = config.owners.count,
        "configuration loaded"
    );

    let mut simulation = Simulation::new(&config)?;
    simulation.run()?;

    println!("{}", simulation.statistics().report());

    Ok(())
}

/// Load configuration from [`CONFIG_PATH`], falling back to defaults
/// when the file does not exist.
fn load_config() -> Result<SimulationConfig, config::ConfigError> {
    let path = Path::new(CONFIG_PATH);
    if path.exists() {
        config::load_config(path)
    } else {
        info!(path = CONFIG_PATH, "no config file, using defaults");
        Ok(SimulationConfig::default())
    }
}
