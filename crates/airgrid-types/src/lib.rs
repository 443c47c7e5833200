//! Shared type definitions for the Airgrid airspace simulation.
//!
//! This crate is the leaf of the workspace: the coordinate model for the
//! discretized 3D+time grid, the travel paths agents fly along, and the
//! strongly-typed identifiers used across all other crates.
//!
//! # Modules
//!
//! - [`ids`] -- UUID-v7 newtype identifiers ([`AgentId`], [`OwnerId`]).
//! - [`coordinate`] -- [`Coordinate`] (spatial) and [`TimeCoordinate`]
//!   (spatiotemporal) value types with distance metrics.
//! - [`path`] -- [`TravelPath`], an ordered sequence of grid cells.

pub mod coordinate;
pub mod ids;
pub mod path;

pub use coordinate::{Coordinate, Tick, TimeCoordinate};
pub use ids::{AgentId, OwnerId};
pub use path::TravelPath;
