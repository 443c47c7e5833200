//! Value functions: pure scoring policies mapping a candidate cell or
//! tick to a utility in [0, 1] given an optimum and a decay shape.
//!
//! Two closed families exist, one over ticks and one over spatial
//! locations, each with the same four shapes:
//!
//! - `OnlyOne` -- 1.0 exactly at the optimum, 0.0 everywhere else.
//! - `Linear` -- decays linearly from 1.0 at the optimum to 0.0 at
//!   `distance_to_zero`.
//! - `Exponential` -- the linear value raised to an exponent, decaying
//!   faster toward the edge.
//! - `Range` -- a plateau: 1.0 strictly inside the range, 0.0 at and
//!   beyond it.
//!
//! Decay-based shapes validate their parameters at construction time;
//! an unusable `distance_to_zero` is a programmer error, not something
//! to paper over at evaluation time.

use airgrid_types::{Coordinate, Tick};
use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Default exponent for the exponential decay shape.
pub const DEFAULT_DECAY_EXPONENT: f64 = 2.0;

/// The norm used to measure spatial differences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Norm {
    /// Manhattan distance (sum of absolute component differences).
    #[default]
    L1,
    /// Euclidean distance.
    L2,
}

impl Norm {
    /// Measure a spatial displacement under this norm.
    #[allow(clippy::cast_precision_loss)]
    pub fn measure(self, delta: Coordinate) -> f64 {
        match self {
            Self::L1 => delta.l1() as f64,
            Self::L2 => delta.l2(),
        }
    }
}

/// Shared decay core: `1 - diff/distance_to_zero`, clamped to 0.0 past
/// the zero distance.
fn linear_decay(diff: f64, distance_to_zero: f64) -> f64 {
    if diff > distance_to_zero {
        0.0
    } else {
        1.0 - diff / distance_to_zero
    }
}

/// Validate a decay distance at construction time.
fn check_distance_to_zero(distance_to_zero: f64) -> Result<(), AgentError> {
    if distance_to_zero > 0.0 {
        Ok(())
    } else {
        Err(AgentError::InvalidValueFunction {
            reason: format!("distance_to_zero must be positive, got {distance_to_zero}"),
        })
    }
}

/// A scoring policy over ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TemporalValueFunction {
    /// 1.0 only at the exact optimum tick.
    OnlyOne {
        /// The tick scoring 1.0.
        optimum: Tick,
    },
    /// Linear decay to 0.0 at `distance_to_zero` ticks away.
    Linear {
        /// The tick scoring 1.0.
        optimum: Tick,
        /// Tick distance at which the value reaches 0.0.
        distance_to_zero: f64,
    },
    /// Linear decay raised to `exponent`.
    Exponential {
        /// The tick scoring 1.0.
        optimum: Tick,
        /// Tick distance at which the value reaches 0.0.
        distance_to_zero: f64,
        /// Decay exponent.
        exponent: f64,
    },
    /// 1.0 strictly inside the window, 0.0 at and beyond it.
    Range {
        /// The center of the window.
        optimum: Tick,
        /// Half-width of the equi-valuable window.
        window: f64,
    },
}

impl TemporalValueFunction {
    /// Exact-match scoring: 1.0 only at `optimum`.
    pub const fn only_one(optimum: Tick) -> Self {
        Self::OnlyOne { optimum }
    }

    /// Linear decay reaching 0.0 at `distance_to_zero` ticks away.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidValueFunction`] for a non-positive
    /// `distance_to_zero`.
    pub fn linear(optimum: Tick, distance_to_zero: f64) -> Result<Self, AgentError> {
        check_distance_to_zero(distance_to_zero)?;
        Ok(Self::Linear {
            optimum,
            distance_to_zero,
        })
    }

    /// Exponential decay reaching 0.0 at `distance_to_zero` ticks away.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidValueFunction`] for a non-positive
    /// `distance_to_zero`.
    pub fn exponential(
        optimum: Tick,
        distance_to_zero: f64,
        exponent: f64,
    ) -> Result<Self, AgentError> {
        check_distance_to_zero(distance_to_zero)?;
        Ok(Self::Exponential {
            optimum,
            distance_to_zero,
            exponent,
        })
    }

    /// Plateau scoring 1.0 strictly inside `window` ticks of `optimum`.
    pub const fn range(optimum: Tick, window: f64) -> Self {
        Self::Range { optimum, window }
    }

    /// Score a candidate tick.
    #[allow(clippy::cast_precision_loss)]
    pub fn evaluate(&self, candidate: Tick) -> f64 {
        match *self {
            Self::OnlyOne { optimum } => {
                if candidate == optimum {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Linear {
                optimum,
                distance_to_zero,
            } => linear_decay(optimum.abs_diff(candidate) as f64, distance_to_zero),
            Self::Exponential {
                optimum,
                distance_to_zero,
                exponent,
            } => linear_decay(optimum.abs_diff(candidate) as f64, distance_to_zero)
                .powf(exponent),
            Self::Range { optimum, window } => {
                if (optimum.abs_diff(candidate) as f64) < window {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// A scoring policy over spatial locations (ticks are ignored).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpatialValueFunction {
    /// 1.0 only at the exact optimum cell.
    OnlyOne {
        /// The cell scoring 1.0.
        optimum: Coordinate,
    },
    /// Linear decay to 0.0 at `distance_to_zero` under `norm`.
    Linear {
        /// The cell scoring 1.0.
        optimum: Coordinate,
        /// Distance at which the value reaches 0.0.
        distance_to_zero: f64,
        /// Norm used to measure distance.
        norm: Norm,
    },
    /// Linear decay raised to `exponent`.
    Exponential {
        /// The cell scoring 1.0.
        optimum: Coordinate,
        /// Distance at which the value reaches 0.0.
        distance_to_zero: f64,
        /// Decay exponent.
        exponent: f64,
        /// Norm used to measure distance.
        norm: Norm,
    },
    /// 1.0 strictly inside `radius` of the optimum, 0.0 at and beyond.
    Range {
        /// The center cell.
        optimum: Coordinate,
        /// Radius of the equi-valuable region.
        radius: f64,
        /// Norm used to measure distance.
        norm: Norm,
    },
}

impl SpatialValueFunction {
    /// Exact-match scoring: 1.0 only at `optimum`.
    pub const fn only_one(optimum: Coordinate) -> Self {
        Self::OnlyOne { optimum }
    }

    /// Linear decay under the given norm.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidValueFunction`] for a non-positive
    /// `distance_to_zero`.
    pub fn linear(
        optimum: Coordinate,
        distance_to_zero: f64,
        norm: Norm,
    ) -> Result<Self, AgentError> {
        check_distance_to_zero(distance_to_zero)?;
        Ok(Self::Linear {
            optimum,
            distance_to_zero,
            norm,
        })
    }

    /// Exponential decay under the given norm.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidValueFunction`] for a non-positive
    /// `distance_to_zero`.
    pub fn exponential(
        optimum: Coordinate,
        distance_to_zero: f64,
        exponent: f64,
        norm: Norm,
    ) -> Result<Self, AgentError> {
        check_distance_to_zero(distance_to_zero)?;
        Ok(Self::Exponential {
            optimum,
            distance_to_zero,
            exponent,
            norm,
        })
    }

    /// Plateau scoring 1.0 strictly inside `radius` of `optimum`.
    pub const fn range(optimum: Coordinate, radius: f64, norm: Norm) -> Self {
        Self::Range {
            optimum,
            radius,
            norm,
        }
    }

    /// Score a candidate location.
    pub fn evaluate(&self, candidate: Coordinate) -> f64 {
        match *self {
            Self::OnlyOne { optimum } => {
                if candidate == optimum {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Linear {
                optimum,
                distance_to_zero,
                norm,
            } => linear_decay(norm.measure(optimum - candidate), distance_to_zero),
            Self::Exponential {
                optimum,
                distance_to_zero,
                exponent,
                norm,
            } => linear_decay(norm.measure(optimum - candidate), distance_to_zero)
                .powf(exponent),
            Self::Range {
                optimum,
                radius,
                norm,
            } => {
                if norm.measure(optimum - candidate) < radius {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}
