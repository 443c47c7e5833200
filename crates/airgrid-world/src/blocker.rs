//! Blockers: obstacles that make grid cells unusable.
//!
//! A blocker forbids cells independently of the allocation state --
//! buildings, no-fly zones, weather fronts. Two kinds exist: a static
//! box blocked at every tick, and a moving box whose anchor follows a
//! per-tick track (blocked only at ticks the track covers).

use airgrid_types::{Coordinate, Tick, TimeCoordinate};
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// An obstacle covering a box of spatial cells.
///
/// The box spans `[anchor, anchor + size)` on each axis, so a size of
/// `(1, 1, 1)` blocks exactly the anchor cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Blocker {
    /// A box blocked at every tick (e.g. a building).
    Static {
        /// Minimum corner of the blocked box.
        origin: Coordinate,
        /// Extent of the blocked box on each axis.
        size: Coordinate,
    },
    /// A box whose anchor moves along a track of per-tick positions
    /// (e.g. a weather cell). Ticks not on the track are unblocked.
    Moving {
        /// Anchor position per tick; one entry per covered tick.
        track: Vec<TimeCoordinate>,
        /// Extent of the blocked box on each axis.
        size: Coordinate,
    },
}

impl Blocker {
    /// Create a moving blocker, validating that the track is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EmptyBlockerTrack`] for an empty track.
    pub fn moving(track: Vec<TimeCoordinate>, size: Coordinate) -> Result<Self, WorldError> {
        if track.is_empty() {
            return Err(WorldError::EmptyBlockerTrack);
        }
        Ok(Self::Moving { track, size })
    }

    /// Whether this blocker covers the given cell at its tick.
    pub fn is_blocked(&self, coordinate: TimeCoordinate) -> bool {
        match self {
            Self::Static { origin, size } => box_contains(*origin, *size, coordinate.location()),
            Self::Moving { track, size } => track
                .iter()
                .filter(|anchor| anchor.t == coordinate.t)
                .any(|anchor| box_contains(anchor.location(), *size, coordinate.location())),
        }
    }

    /// The spatial cells this blocker covers at a given tick. Used by
    /// the grid renderer.
    pub fn coordinates_at(&self, t: Tick) -> Vec<Coordinate> {
        match self {
            Self::Static { origin, size } => box_cells(*origin, *size),
            Self::Moving { track, size } => track
                .iter()
                .filter(|anchor| anchor.t == t)
                .flat_map(|anchor| box_cells(anchor.location(), *size))
                .collect(),
        }
    }
}

/// Whether `location` lies within the half-open box `[origin, origin + size)`.
fn box_contains(origin: Coordinate, size: Coordinate, location: Coordinate) -> bool {
    let max = origin + size;
    location.x >= origin.x
        && location.x < max.x
        && location.y >= origin.y
        && location.y < max.y
        && location.z >= origin.z
        && location.z < max.z
}

/// Enumerate the cells of the half-open box `[origin, origin + size)`.
fn box_cells(origin: Coordinate, size: Coordinate) -> Vec<Coordinate> {
    let max = origin + size;
    let mut cells = Vec::new();
    for x in origin.x..max.x {
        for y in origin.y..max.y {
            for z in origin.z..max.z {
                cells.push(Coordinate::new(x, y, z));
            }
        }
    }
    cells
}
