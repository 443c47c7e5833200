//! Error types for the simulation binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and simulation execution.

/// Top-level error for the simulation binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crate::config::ConfigError,
    },

    /// Grid environment construction failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: airgrid_world::WorldError,
    },

    /// The allocator failed with a bookkeeping violation that must not
    /// be swallowed as an ordinary rejection.
    #[error("allocator error: {source}")]
    Core {
        /// The underlying allocator error.
        #[from]
        source: airgrid_core::CoreError,
    },
}
