//! Spatial and spatiotemporal coordinates on the discretized grid.
//!
//! The grid is a 3D lattice of cells extended along a fourth, discrete
//! time axis. [`Coordinate`] addresses a spatial cell, [`TimeCoordinate`]
//! addresses a spatial cell at a specific tick. Both are small `Copy`
//! value types with total ordering so they can key sorted maps.
//!
//! # Arithmetic Conventions
//!
//! Adding a spatial delta to a [`TimeCoordinate`] leaves the tick
//! untouched; adding two [`TimeCoordinate`]s also sums the ticks.
//! Subtraction always yields a pure spatial [`Coordinate`] delta -- the
//! tick is dropped, never negated. This asymmetry is intentional: a
//! difference between grid cells is a displacement, and displacements
//! carry no time of their own.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Discrete simulation time. Tick 0 is the start of the simulation;
/// time is unbounded upward.
pub type Tick = u64;

/// A spatial grid cell address (no time component).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Coordinate {
    /// Position along the x axis.
    pub x: i64,
    /// Position along the y axis.
    pub y: i64,
    /// Position along the z axis (altitude layer).
    pub z: i64,
}

impl Coordinate {
    /// Create a spatial coordinate from its components.
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// Canonical string key (`x_y_z`), used for log correlation and
    /// display; map keys use the type's own ordering.
    pub fn key(&self) -> String {
        format!("{}_{}_{}", self.x, self.y, self.z)
    }

    /// L1 (Manhattan) norm of this coordinate treated as a displacement.
    pub const fn l1(&self) -> i64 {
        self.x
            .saturating_abs()
            .saturating_add(self.y.saturating_abs())
            .saturating_add(self.z.saturating_abs())
    }

    /// L2 (Euclidean) norm of this coordinate treated as a displacement.
    #[allow(clippy::cast_precision_loss)]
    pub fn l2(&self) -> f64 {
        let x = self.x as f64;
        let y = self.y as f64;
        let z = self.z as f64;
        x.mul_add(x, y.mul_add(y, z * z)).sqrt()
    }
}

impl Add for Coordinate {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x.saturating_add(rhs.x),
            y: self.y.saturating_add(rhs.y),
            z: self.z.saturating_add(rhs.z),
        }
    }
}

impl Sub for Coordinate {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x.saturating_sub(rhs.x),
            y: self.y.saturating_sub(rhs.y),
            z: self.z.saturating_sub(rhs.z),
        }
    }
}

impl core::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A grid cell at a specific discrete tick.
///
/// Equality is exact on all four components. Use [`Self::same_location`]
/// for the location-only relation that ignores time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TimeCoordinate {
    /// Position along the x axis.
    pub x: i64,
    /// Position along the y axis.
    pub y: i64,
    /// Position along the z axis (altitude layer).
    pub z: i64,
    /// The tick at which the cell is addressed.
    pub t: Tick,
}

impl TimeCoordinate {
    /// Create a spatiotemporal coordinate from its components.
    pub const fn new(x: i64, y: i64, z: i64, t: Tick) -> Self {
        Self { x, y, z, t }
    }

    /// Create a spatiotemporal coordinate from a spatial cell and a tick.
    pub const fn at(location: Coordinate, t: Tick) -> Self {
        Self {
            x: location.x,
            y: location.y,
            z: location.z,
            t,
        }
    }

    /// The spatial cell this coordinate addresses, with the tick dropped.
    pub const fn location(&self) -> Coordinate {
        Coordinate {
            x: self.x,
            y: self.y,
            z: self.z,
        }
    }

    /// Canonical string key (`x_y_z_t`).
    pub fn key(&self) -> String {
        format!("{}_{}_{}_{}", self.x, self.y, self.z, self.t)
    }

    /// Location-only equality: same spatial cell, any tick.
    pub const fn same_location(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y && self.z == other.z
    }

    /// Spatial L1 (Manhattan) distance to another coordinate, ignoring time.
    pub fn spatial_l1(&self, other: &Self) -> i64 {
        (self.location() - other.location()).l1()
    }

    /// Spatial L2 (Euclidean) distance to another coordinate, ignoring time.
    pub fn spatial_l2(&self, other: &Self) -> f64 {
        (self.location() - other.location()).l2()
    }

    /// Absolute tick difference to another coordinate. Callers combine
    /// this with one of the spatial distances to form a search metric.
    pub const fn tick_distance(&self, other: &Self) -> u64 {
        self.t.abs_diff(other.t)
    }
}

impl Add<Coordinate> for TimeCoordinate {
    type Output = Self;

    /// Displace spatially; the tick is unchanged.
    fn add(self, rhs: Coordinate) -> Self {
        Self {
            x: self.x.saturating_add(rhs.x),
            y: self.y.saturating_add(rhs.y),
            z: self.z.saturating_add(rhs.z),
            t: self.t,
        }
    }
}

impl Add for TimeCoordinate {
    type Output = Self;

    /// Displace spatially and advance the tick by the right operand's tick.
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x.saturating_add(rhs.x),
            y: self.y.saturating_add(rhs.y),
            z: self.z.saturating_add(rhs.z),
            t: self.t.saturating_add(rhs.t),
        }
    }
}

impl Sub for TimeCoordinate {
    type Output = Coordinate;

    /// Spatial displacement between two cells; the tick is dropped.
    fn sub(self, rhs: Self) -> Coordinate {
        self.location() - rhs.location()
    }
}

impl Sub<Coordinate> for TimeCoordinate {
    type Output = Coordinate;

    /// Spatial displacement from a spatial cell; the tick is dropped.
    fn sub(self, rhs: Coordinate) -> Coordinate {
        self.location() - rhs
    }
}

impl core::fmt::Display for TimeCoordinate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {}, {}, t={})", self.x, self.y, self.z, self.t)
    }
}
