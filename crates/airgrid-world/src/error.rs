//! Error types for the `airgrid-world` crate.

use airgrid_types::Coordinate;

/// Errors that can occur during grid-environment operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The grid dimension has a non-positive extent on some axis.
    #[error("invalid grid dimension {dimension}: all extents must be positive")]
    InvalidDimension {
        /// The rejected dimension.
        dimension: Coordinate,
    },

    /// A moving blocker was created with an empty track.
    #[error("moving blocker has an empty track")]
    EmptyBlockerTrack,
}
