//! The spatiotemporal slot allocator for the Airgrid simulation.
//!
//! This crate is the algorithmic heart of the workspace. It routes
//! agents through the 4-dimensional lattice with an A*-style pathfinder
//! and resolves contention over scarce cells by recursive welfare
//! comparison: when a newcomer's route crosses an incumbent's
//! allocation, both futures -- newcomer wins, newcomer loses -- are
//! played out on independent environment snapshots and the one worth
//! more in aggregate is committed.
//!
//! # Modules
//!
//! - [`error`] -- [`CoreError`], the allocation failure taxonomy.
//! - [`astar`] -- Minimum-step routing over the spatiotemporal lattice.
//! - [`allocator`] -- The recursive slot resolver and its commit
//!   discipline.

pub mod allocator;
pub mod astar;
pub mod error;

pub use allocator::{AgentRegistry, Allocator};
pub use astar::{MAX_EXPANSIONS, RouteRequest, find_route};
pub use error::CoreError;
