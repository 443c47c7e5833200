//! Engine configuration, loaded from `airgrid-config.yaml`.
//!
//! Every field has a serde default so a partial file (or none at all)
//! yields a runnable simulation.

use std::path::Path;

use serde::Deserialize;

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct SimulationConfig {
    /// Grid and run-length parameters.
    #[serde(default)]
    pub world: WorldConfig,
    /// Owner population parameters.
    #[serde(default)]
    pub owners: OwnersConfig,
    /// Output and rendering parameters.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Grid bounds, seed, and run length.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Display name for the run.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// RNG seed; identical seeds reproduce identical runs.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Grid extent on the x axis.
    #[serde(default = "default_extent")]
    pub dimension_x: i64,

    /// Grid extent on the y axis.
    #[serde(default = "default_extent")]
    pub dimension_y: i64,

    /// Grid extent on the z axis (altitude layers).
    #[serde(default = "default_layers")]
    pub dimension_z: i64,

    /// Number of ticks to simulate.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Permanently blocked boxes (buildings, no-fly zones).
    #[serde(default)]
    pub blockers: Vec<BlockerConfig>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            dimension_x: default_extent(),
            dimension_y: default_extent(),
            dimension_z: default_layers(),
            max_ticks: default_max_ticks(),
            blockers: Vec::new(),
        }
    }
}

/// A static blocked box: minimum corner and extent per axis.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockerConfig {
    /// Minimum corner as `[x, y, z]`.
    pub origin: [i64; 3],
    /// Extent on each axis as `[x, y, z]`.
    pub size: [i64; 3],
}

/// Owner population parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OwnersConfig {
    /// Number of owners injecting agents.
    #[serde(default = "default_owner_count")]
    pub count: u32,

    /// Upper bound on agents each owner may inject over the run.
    #[serde(default = "default_owner_quota")]
    pub quota: u32,
}

impl Default for OwnersConfig {
    fn default() -> Self {
        Self {
            count: default_owner_count(),
            quota: default_owner_quota(),
        }
    }
}

/// Output and rendering parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Print the ASCII grid after each tick.
    #[serde(default = "default_render_grid")]
    pub render_grid: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            render_grid: default_render_grid(),
        }
    }
}

fn default_world_name() -> String {
    String::from("airgrid")
}

const fn default_seed() -> u64 {
    42
}

const fn default_extent() -> i64 {
    10
}

const fn default_layers() -> i64 {
    1
}

const fn default_max_ticks() -> u64 {
    20
}

const fn default_owner_count() -> u32 {
    2
}

const fn default_owner_quota() -> u32 {
    4
}

const fn default_render_grid() -> bool {
    true
}

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config file {path}: {source}")]
    Io {
        /// Path that failed to load.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for the expected shape.
    #[error("cannot parse config file: {source}")]
    Parse {
        /// The underlying parse error.
        source: serde_yml::Error,
    },
}

/// Load configuration from a YAML file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::Parse`] if it is not valid YAML for the expected
/// shape.
pub fn load_config(path: &Path) -> Result<SimulationConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_yml::from_str(&raw).map_err(|source| ConfigError::Parse { source })
}
