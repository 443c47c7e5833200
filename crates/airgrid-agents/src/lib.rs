//! Agents, points of interest, and trajectory valuation.
//!
//! An agent wants to visit an ordered sequence of spatiotemporal
//! waypoints and expresses how much it cares about hitting each one
//! exactly through pluggable value functions. The allocator scores
//! candidate trajectories with [`Agent::value_of_path`] and uses the
//! resulting welfare numbers to arbitrate contested cells.
//!
//! # Modules
//!
//! - [`error`] -- Error types for agent construction.
//! - [`value`] -- The value-function families (spatial and temporal).
//! - [`interest`] -- [`PointOfInterest`], a waypoint with its own
//!   scoring policy.
//! - [`agent`] -- [`Agent`], identity, economics, and path valuation.
//!
//! [`Agent::value_of_path`]: agent::Agent::value_of_path

pub mod agent;
pub mod error;
pub mod interest;
pub mod value;

pub use agent::Agent;
pub use error::AgentError;
pub use interest::PointOfInterest;
pub use value::{Norm, SpatialValueFunction, TemporalValueFunction};
