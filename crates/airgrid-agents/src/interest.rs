//! Points of interest: required waypoints with their own scoring policy.
//!
//! A point of interest is a `(location, tick)` pair an agent's
//! trajectory is scored against. By default both the spatial and the
//! temporal policy demand an exact match (value 1.0 only at the exact
//! cell and tick); either can be swapped for a decaying function to
//! express "near here, around then" preferences.

use airgrid_types::{Coordinate, Tick, TimeCoordinate, TravelPath};
use serde::{Deserialize, Serialize};

use crate::value::{SpatialValueFunction, TemporalValueFunction};

/// A required waypoint an agent's trajectory is scored against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    /// The desired cell.
    pub location: Coordinate,
    /// The desired arrival tick.
    pub tick: Tick,
    /// Scoring policy for how close the trajectory comes spatially.
    spatial_value: SpatialValueFunction,
    /// Scoring policy for how close the trajectory comes in time.
    temporal_value: TemporalValueFunction,
}

impl PointOfInterest {
    /// Create a waypoint with exact-match scoring on both axes.
    pub const fn new(location: Coordinate, tick: Tick) -> Self {
        Self {
            location,
            tick,
            spatial_value: SpatialValueFunction::only_one(location),
            temporal_value: TemporalValueFunction::only_one(tick),
        }
    }

    /// Replace the spatial scoring policy.
    pub fn set_spatial_value(&mut self, value: SpatialValueFunction) {
        self.spatial_value = value;
    }

    /// Replace the temporal scoring policy.
    pub fn set_temporal_value(&mut self, value: TemporalValueFunction) {
        self.temporal_value = value;
    }

    /// The waypoint as a spatiotemporal grid cell.
    pub const fn to_time_coordinate(&self) -> TimeCoordinate {
        TimeCoordinate::at(self.location, self.tick)
    }

    /// Score a trajectory against this waypoint: the best single-instant
    /// match achieved anywhere along the path, i.e. the maximum over all
    /// path cells of `spatial(cell) * temporal(cell.t)`. An empty path
    /// scores 0.0.
    pub fn value_of_path(&self, path: &TravelPath) -> f64 {
        path.iter()
            .map(|cell| {
                self.spatial_value.evaluate(cell.location())
                    * self.temporal_value.evaluate(cell.t)
            })
            .fold(0.0, f64::max)
    }
}
