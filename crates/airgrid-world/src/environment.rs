//! The grid environment: a sparse map of fields with allocation bookkeeping.
//!
//! Space is bounded by a dimension on each axis; time is unbounded. The
//! field map is sparse: an absent key means a free, unallocated,
//! unoccupied cell, and fields are created lazily on first mutation.
//!
//! # Snapshot Discipline
//!
//! [`Environment`] derives [`Clone`], and a clone is an independent deep
//! copy of the field map and agent bookkeeping (every map is owned).
//! The allocator explores speculative resolution branches on clones and
//! commits exactly one of them back; mutating a clone never leaks into
//! the original.

use std::collections::{BTreeMap, BTreeSet};

use airgrid_types::{AgentId, Coordinate, TimeCoordinate};
use serde::{Deserialize, Serialize};

use crate::blocker::Blocker;
use crate::error::WorldError;
use crate::field::Field;

/// The spatiotemporal grid: dimension bounds, sparse fields, blockers,
/// and the set of currently active agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Exclusive upper bound on each spatial axis; valid cells lie in
    /// `[0, dimension)`.
    dimension: Coordinate,
    /// Sparse cell map. Absent key means a free cell.
    fields: BTreeMap<TimeCoordinate, Field>,
    /// Agents currently admitted to the grid.
    active_agents: BTreeSet<AgentId>,
    /// Obstacles independent of allocation.
    blockers: Vec<Blocker>,
}

impl Environment {
    /// Create an empty environment with the given spatial bounds.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimension`] if any extent is not
    /// positive.
    pub fn new(dimension: Coordinate) -> Result<Self, WorldError> {
        Self::with_blockers(dimension, Vec::new())
    }

    /// Create an environment with spatial bounds and a set of blockers.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimension`] if any extent is not
    /// positive.
    pub fn with_blockers(
        dimension: Coordinate,
        blockers: Vec<Blocker>,
    ) -> Result<Self, WorldError> {
        if dimension.x <= 0 || dimension.y <= 0 || dimension.z <= 0 {
            return Err(WorldError::InvalidDimension { dimension });
        }
        Ok(Self {
            dimension,
            fields: BTreeMap::new(),
            active_agents: BTreeSet::new(),
            blockers,
        })
    }

    /// The exclusive spatial upper bound on each axis.
    pub const fn dimension(&self) -> Coordinate {
        self.dimension
    }

    /// Whether the cell lies within the spatial bounds. Time is
    /// unbounded, so only (x, y, z) are checked.
    pub const fn in_bounds(&self, coordinate: TimeCoordinate) -> bool {
        coordinate.x >= 0
            && coordinate.x < self.dimension.x
            && coordinate.y >= 0
            && coordinate.y < self.dimension.y
            && coordinate.z >= 0
            && coordinate.z < self.dimension.z
    }

    /// Whether the cell is unusable: outside the bounds or covered by a
    /// blocker at its tick.
    pub fn is_blocked(&self, coordinate: TimeCoordinate) -> bool {
        if !self.in_bounds(coordinate) {
            return true;
        }
        self.blockers
            .iter()
            .any(|blocker| blocker.is_blocked(coordinate))
    }

    /// Read-only probe for the field at a cell. Never mutates the sparse
    /// map; an absent field means a free cell.
    pub fn field_at(&self, coordinate: TimeCoordinate) -> Option<&Field> {
        self.fields.get(&coordinate)
    }

    /// Mutable access to the field at a cell, lazily creating an empty
    /// field if none exists yet.
    pub fn field_at_mut(&mut self, coordinate: TimeCoordinate) -> &mut Field {
        self.fields
            .entry(coordinate)
            .or_insert_with(|| Field::new(coordinate))
    }

    /// The agent holding the allocation grant for a cell, if any.
    pub fn allocated_to(&self, coordinate: TimeCoordinate) -> Option<AgentId> {
        self.fields
            .get(&coordinate)
            .and_then(|field| field.allocated_to)
    }

    /// Admit an agent to the active set.
    pub fn register_agent(&mut self, agent: AgentId) {
        self.active_agents.insert(agent);
    }

    /// Whether an agent is currently active on the grid.
    pub fn is_active(&self, agent: AgentId) -> bool {
        self.active_agents.contains(&agent)
    }

    /// The agents currently active on the grid.
    pub const fn active_agents(&self) -> &BTreeSet<AgentId> {
        &self.active_agents
    }

    /// Iterate over all materialized fields, in coordinate order.
    pub fn fields(&self) -> impl Iterator<Item = (&TimeCoordinate, &Field)> {
        self.fields.iter()
    }

    /// Number of materialized fields. The grid itself is much larger;
    /// this counts only cells something has touched.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// The blockers installed on this grid.
    pub fn blockers(&self) -> &[Blocker] {
        &self.blockers
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn small_env() -> Environment {
        Environment::new(Coordinate::new(10, 10, 2)).unwrap()
    }

    #[test]
    fn dimension_must_be_positive() {
        assert!(Environment::new(Coordinate::new(0, 10, 10)).is_err());
        assert!(Environment::new(Coordinate::new(10, -1, 10)).is_err());
        assert!(Environment::new(Coordinate::new(10, 10, 1)).is_ok());
    }

    #[test]
    fn read_probe_does_not_materialize() {
        let env = small_env();
        let coord = TimeCoordinate::new(1, 1, 0, 5);
        assert!(env.field_at(coord).is_none());
        assert_eq!(env.field_count(), 0);
    }

    #[test]
    fn mutable_access_creates_lazily() {
        let mut env = small_env();
        let coord = TimeCoordinate::new(1, 1, 0, 5);
        env.field_at_mut(coord).allocated_to = Some(AgentId::new());
        assert_eq!(env.field_count(), 1);
        assert!(env.field_at(coord).is_some());
    }

    #[test]
    fn bounds_checking() {
        let env = small_env();
        assert!(env.in_bounds(TimeCoordinate::new(0, 0, 0, 0)));
        assert!(env.in_bounds(TimeCoordinate::new(9, 9, 1, 1000)));
        assert!(!env.in_bounds(TimeCoordinate::new(10, 0, 0, 0)));
        assert!(!env.in_bounds(TimeCoordinate::new(-1, 0, 0, 0)));
        // Out of bounds implies blocked.
        assert!(env.is_blocked(TimeCoordinate::new(10, 0, 0, 0)));
    }

    #[test]
    fn blockers_block_cells() {
        let blocker = Blocker::Static {
            origin: Coordinate::new(3, 3, 0),
            size: Coordinate::new(1, 1, 1),
        };
        let env =
            Environment::with_blockers(Coordinate::new(10, 10, 1), vec![blocker]).unwrap();
        assert!(env.is_blocked(TimeCoordinate::new(3, 3, 0, 7)));
        assert!(!env.is_blocked(TimeCoordinate::new(4, 3, 0, 7)));
    }

    #[test]
    fn clone_is_independent() {
        let mut original = small_env();
        let coord = TimeCoordinate::new(2, 2, 0, 3);
        let holder = AgentId::new();
        original.field_at_mut(coord).allocated_to = Some(holder);

        let mut snapshot = original.clone();
        snapshot.field_at_mut(coord).allocated_to = None;
        snapshot
            .field_at_mut(TimeCoordinate::new(4, 4, 0, 3))
            .allocated_to = Some(holder);

        // The original is untouched by mutations of the snapshot.
        assert_eq!(original.allocated_to(coord), Some(holder));
        assert!(original.field_at(TimeCoordinate::new(4, 4, 0, 3)).is_none());
    }

    #[test]
    fn agent_registry() {
        let mut env = small_env();
        let agent = AgentId::new();
        assert!(!env.is_active(agent));
        env.register_agent(agent);
        assert!(env.is_active(agent));
        assert_eq!(env.active_agents().len(), 1);
    }
}
