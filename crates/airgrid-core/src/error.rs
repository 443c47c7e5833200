//! Error types for the `airgrid-core` crate.
//!
//! Pathfinder exhaustion is reported as an absence at the search layer
//! and becomes [`CoreError::NoRoute`] at the allocator layer. The
//! bookkeeping variants ([`CoreError::MissingAgent`],
//! [`CoreError::MissingAllocation`]) indicate invariant violations and
//! abort the allocation attempt rather than being papered over.

use airgrid_types::{AgentId, TimeCoordinate};

/// Errors that can occur while allocating a trajectory.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The pathfinder found no route for a waypoint segment within its
    /// expansion budget.
    #[error("no route for agent {agent} from {from} to {to}")]
    NoRoute {
        /// The agent being routed.
        agent: AgentId,
        /// Segment start.
        from: TimeCoordinate,
        /// Segment goal.
        to: TimeCoordinate,
    },

    /// The recursion depth guard tripped while resolving preemption
    /// chains. Termination normally follows from the growing override
    /// sets; this guard is defense in depth.
    #[error("recursion limit reached resolving agent {agent} at depth {depth}")]
    RecursionLimit {
        /// The agent being resolved when the guard tripped.
        agent: AgentId,
        /// The depth at which the guard tripped.
        depth: usize,
    },

    /// An agent referenced by allocation state is missing from the
    /// registry.
    #[error("agent {agent} is not in the registry")]
    MissingAgent {
        /// The missing agent.
        agent: AgentId,
    },

    /// Welfare scoring needed an allocation entry that does not exist.
    #[error("no tentative allocation recorded for agent {agent}")]
    MissingAllocation {
        /// The agent without an allocation entry.
        agent: AgentId,
    },

    /// An agent's desired path has fewer than two waypoints, so there is
    /// nothing to route.
    #[error("agent {agent} has no routable desired path")]
    EmptyDesiredPath {
        /// The agent with the unusable desired path.
        agent: AgentId,
    },

    /// Neither resolution branch of a contested cell produced a viable
    /// allocation.
    #[error("no viable resolution for contested cell {cell}")]
    ConflictUnresolved {
        /// The contested cell.
        cell: TimeCoordinate,
    },
}
