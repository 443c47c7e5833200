//! The recursive slot resolver: admission, collision branches, and the
//! welfare rule.
//!
//! Admission is greedy, one agent at a time. For each newly arriving
//! agent the allocator routes every consecutive waypoint pair, commits
//! collision-free segments directly, and resolves contested cells by
//! playing out both futures on independent environment snapshots:
//!
//! - Branch A, "newcomer wins": the newcomer routes through the
//!   contested cell and the incumbent is rerouted around everything the
//!   newcomer claimed.
//! - Branch B, "newcomer loses": the newcomer detours and the incumbent
//!   keeps its standing allocation.
//!
//! The branch with the strictly greater aggregate value is committed;
//! ties keep the incumbent in place. Discarded branches leave no
//! residue -- all speculation happens on clones, and the live
//! environment is replaced wholesale only when the full resolution
//! succeeds.
//!
//! Termination: every recursive call strictly grows one of the
//! blocked/free override sets, which bounds the preemption chain by the
//! number of distinct contested cells along a route. An explicit depth
//! guard backs this up.

use std::collections::BTreeMap;

use airgrid_agents::{Agent, PointOfInterest};
use airgrid_types::{AgentId, TimeCoordinate, TravelPath};
use airgrid_world::Environment;
use tracing::{debug, info};

use crate::astar::{RouteRequest, find_route};
use crate::error::CoreError;

/// Default bound on recursive resolution depth.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// All agents known to the simulation, keyed by identity. The allocator
/// reads waypoints and economics from here and writes back committed
/// paths.
pub type AgentRegistry = BTreeMap<AgentId, Agent>;

/// Per-resolution bookkeeping: the trajectory each agent would hold if
/// the current speculative state were committed.
type TentativeAllocations = BTreeMap<AgentId, TravelPath>;

/// The spatiotemporal slot allocator.
#[derive(Debug, Clone, Copy)]
pub struct Allocator {
    max_depth: usize,
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new()
    }
}

impl Allocator {
    /// Create an allocator with the default recursion bound.
    pub const fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Create an allocator with a custom recursion bound.
    pub const fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Compute and commit a trajectory for a newly arriving agent.
    ///
    /// On success the environment's allocation map is replaced with the
    /// resolved state, the newcomer joins the active set, and the
    /// `allocated_path` of every affected agent (the newcomer and any
    /// displaced incumbents) is rewritten. On failure the newcomer is
    /// not admitted and the environment is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoRoute`] if some waypoint segment cannot be
    /// routed, [`CoreError::RecursionLimit`] if the depth guard trips,
    /// or a bookkeeping variant on invariant violations.
    pub fn allocate_for_agent(
        &self,
        env: &mut Environment,
        agents: &mut AgentRegistry,
        agent: Agent,
    ) -> Result<(), CoreError> {
        let agent_id = agent.id;

        // Seed the tentative table with every active agent's committed
        // trajectory; the resolver reroutes entries as needed.
        let mut tentative = TentativeAllocations::new();
        for active in env.active_agents() {
            if let Some(record) = agents.get(active)
                && let Some(path) = &record.allocated_path
            {
                tentative.insert(*active, path.clone());
            }
        }

        let previous = agents.insert(agent_id, agent);

        match self.resolve(
            agent_id,
            env.clone(),
            tentative,
            Vec::new(),
            Vec::new(),
            agents,
            0,
        ) {
            Ok((resolved, resolved_env)) => {
                *env = resolved_env;
                env.register_agent(agent_id);
                for (id, path) in &resolved {
                    if let Some(record) = agents.get_mut(id) {
                        record.allocated_path = Some(path.clone());
                    }
                }
                info!(
                    agent = %agent_id,
                    rerouted = resolved.len().saturating_sub(1),
                    "trajectory committed"
                );
                Ok(())
            }
            Err(err) => {
                // Undo the registry insert; a rejected newcomer (or a
                // failed re-admission) must not corrupt the registry.
                match previous {
                    Some(record) => {
                        agents.insert(agent_id, record);
                    }
                    None => {
                        agents.remove(&agent_id);
                    }
                }
                Err(err)
            }
        }
    }

    /// Recursively resolve a trajectory for `agent_id` on a speculative
    /// environment, returning the updated bookkeeping and environment.
    #[allow(clippy::too_many_arguments, clippy::too_many_lines)]
    fn resolve(
        &self,
        agent_id: AgentId,
        mut env: Environment,
        mut tentative: TentativeAllocations,
        blocked: Vec<TimeCoordinate>,
        free: Vec<TimeCoordinate>,
        agents: &AgentRegistry,
        depth: usize,
    ) -> Result<(TentativeAllocations, Environment), CoreError> {
        if depth >= self.max_depth {
            return Err(CoreError::RecursionLimit {
                agent: agent_id,
                depth,
            });
        }

        // This agent's route is being recomputed from scratch: release
        // every cell it tentatively holds. Cells already re-claimed by
        // another branch participant stay theirs.
        if let Some(standing) = tentative.remove(&agent_id) {
            for cell in &standing {
                let field = env.field_at_mut(*cell);
                if field.allocated_to == Some(agent_id) {
                    field.allocated_to = None;
                }
            }
        }

        let record = agents.get(&agent_id).ok_or(CoreError::MissingAgent {
            agent: agent_id,
        })?;
        let waypoints = record
            .calculate_desired_path()
            .into_iter()
            .next()
            .unwrap_or_default();
        if waypoints.len() < 2 {
            return Err(CoreError::EmptyDesiredPath { agent: agent_id });
        }

        let mut start = waypoints
            .first()
            .map(PointOfInterest::to_time_coordinate)
            .ok_or(CoreError::EmptyDesiredPath { agent: agent_id })?;

        for waypoint in waypoints.iter().skip(1) {
            let mut goal = waypoint.to_time_coordinate();

            // A segment may not begin or end on a forbidden cell; shift
            // forward in time until clear.
            while blocked.contains(&start) {
                start.t = start.t.saturating_add(1);
            }
            while blocked.contains(&goal) {
                goal.t = goal.t.saturating_add(1);
            }

            let request = RouteRequest {
                start,
                goal,
                agent: agent_id,
                speed: record.speed,
                ignore_collisions: true,
                assume_free: &free,
                assume_blocked: &blocked,
            };
            let segment = find_route(&request, &env).ok_or(CoreError::NoRoute {
                agent: agent_id,
                from: start,
                to: goal,
            })?;

            // First foreign claim on the candidate segment, if any.
            let collision = segment.iter().find_map(|cell| {
                env.allocated_to(*cell).and_then(|holder| {
                    (holder != agent_id && !free.contains(cell)).then_some((*cell, holder))
                })
            });

            match collision {
                None => {
                    for cell in &segment {
                        env.field_at_mut(*cell).allocated_to = Some(agent_id);
                    }
                    extend_tentative(&mut tentative, agent_id, segment.clone());
                    start = segment.last().copied().unwrap_or(start);
                }
                Some((cell, incumbent)) => {
                    debug!(
                        cell = %cell,
                        newcomer = %agent_id,
                        incumbent = %incumbent,
                        depth,
                        "contested cell on candidate route"
                    );
                    return self.resolve_conflict(
                        agent_id, incumbent, cell, &env, &tentative, &blocked, &free, agents,
                        depth,
                    );
                }
            }
        }

        Ok((tentative, env))
    }

    /// Play out both futures of a contested cell and keep the one worth
    /// more. Later collisions on the same segment are handled by the
    /// recursive sub-resolutions.
    #[allow(clippy::too_many_arguments)]
    fn resolve_conflict(
        &self,
        agent_id: AgentId,
        incumbent: AgentId,
        cell: TimeCoordinate,
        env: &Environment,
        tentative: &TentativeAllocations,
        blocked: &[TimeCoordinate],
        free: &[TimeCoordinate],
        agents: &AgentRegistry,
        depth: usize,
    ) -> Result<(TentativeAllocations, Environment), CoreError> {
        let next_depth = depth.saturating_add(1);

        // Branch A: the newcomer routes through the contested cell, and
        // the incumbent must reroute around every cell the newcomer is
        // assumed to claim.
        let mut newcomer_free = free.to_vec();
        newcomer_free.push(cell);
        let mut incumbent_blocked = free.to_vec();
        incumbent_blocked.push(cell);

        let branch_a = self
            .resolve(
                agent_id,
                env.clone(),
                tentative.clone(),
                blocked.to_vec(),
                newcomer_free,
                agents,
                next_depth,
            )
            .and_then(|(allocations, branch_env)| {
                self.resolve(
                    incumbent,
                    branch_env,
                    allocations,
                    incumbent_blocked,
                    Vec::new(),
                    agents,
                    next_depth,
                )
            });
        let branch_a = viable(branch_a)?;

        // Branch B: the newcomer detours around the contested cell and
        // the incumbent's allocation stands.
        let mut newcomer_blocked = blocked.to_vec();
        newcomer_blocked.push(cell);

        let branch_b = viable(self.resolve(
            agent_id,
            env.clone(),
            tentative.clone(),
            newcomer_blocked,
            free.to_vec(),
            agents,
            next_depth,
        ))?;

        let scored_a = branch_a
            .map(|outcome| score_branch(agents, agent_id, incumbent, outcome))
            .transpose()?;
        let scored_b = branch_b
            .map(|outcome| score_branch(agents, agent_id, incumbent, outcome))
            .transpose()?;

        match (scored_a, scored_b) {
            (Some((welfare_a, outcome_a)), Some((welfare_b, outcome_b))) => {
                debug!(
                    cell = %cell,
                    welfare_newcomer_wins = welfare_a,
                    welfare_newcomer_loses = welfare_b,
                    "welfare comparison"
                );
                // Strictly greater: ties keep the incumbent in place.
                if welfare_a > welfare_b {
                    Ok(outcome_a)
                } else {
                    Ok(outcome_b)
                }
            }
            (Some((_, outcome_a)), None) => Ok(outcome_a),
            (None, Some((_, outcome_b))) => Ok(outcome_b),
            (None, None) => Err(CoreError::ConflictUnresolved { cell }),
        }
    }
}

/// Map a routing failure to "branch not viable"; let every other error
/// propagate.
#[allow(clippy::type_complexity)]
fn viable(
    result: Result<(TentativeAllocations, Environment), CoreError>,
) -> Result<Option<(TentativeAllocations, Environment)>, CoreError> {
    match result {
        Ok(outcome) => Ok(Some(outcome)),
        Err(CoreError::NoRoute { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Aggregate welfare of a branch: the newcomer's value of its resolved
/// path plus the incumbent's value of whatever path the branch left it.
#[allow(clippy::type_complexity)]
fn score_branch(
    agents: &AgentRegistry,
    newcomer: AgentId,
    incumbent: AgentId,
    outcome: (TentativeAllocations, Environment),
) -> Result<(f64, (TentativeAllocations, Environment)), CoreError> {
    let welfare = allocated_value(agents, newcomer, &outcome.0)?
        + allocated_value(agents, incumbent, &outcome.0)?;
    Ok((welfare, outcome))
}

/// An agent's value of its entry in the tentative table. A missing
/// entry is an invariant violation, never an implicit empty path.
fn allocated_value(
    agents: &AgentRegistry,
    agent: AgentId,
    tentative: &TentativeAllocations,
) -> Result<f64, CoreError> {
    let record = agents
        .get(&agent)
        .ok_or(CoreError::MissingAgent { agent })?;
    let path = tentative
        .get(&agent)
        .ok_or(CoreError::MissingAllocation { agent })?;
    Ok(record.value_of_path(path))
}

/// Append a segment to an agent's tentative path, dropping the joint
/// cell when the segment continues exactly where the path ends.
fn extend_tentative(
    tentative: &mut TentativeAllocations,
    agent: AgentId,
    segment: Vec<TimeCoordinate>,
) {
    match tentative.get_mut(&agent) {
        Some(path) => {
            let joint = path.last();
            let mut cells = segment;
            if joint.is_some() && cells.first().copied() == joint {
                cells.remove(0);
            }
            path.extend_with(cells);
        }
        None => {
            tentative.insert(agent, TravelPath::new(segment));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use airgrid_types::Coordinate;

    use super::*;

    fn open_env() -> Environment {
        Environment::new(Coordinate::new(10, 10, 1)).unwrap()
    }

    fn agent_between(
        name: &str,
        revenue: f64,
        from: (i64, i64, i64, u64),
        to: (i64, i64, i64, u64),
    ) -> Agent {
        Agent::new(
            name,
            revenue,
            vec![
                PointOfInterest::new(Coordinate::new(from.0, from.1, from.2), from.3),
                PointOfInterest::new(Coordinate::new(to.0, to.1, to.2), to.3),
            ],
        )
    }

    /// Every committed allocation names exactly one holder whose own
    /// path contains the cell.
    fn assert_exclusive(env: &Environment, agents: &AgentRegistry) {
        for (coord, field) in env.fields() {
            if let Some(holder) = field.allocated_to {
                let record = agents.get(&holder).expect("holder must be registered");
                let path = record
                    .allocated_path
                    .as_ref()
                    .expect("holder must have a committed path");
                assert!(
                    path.contains(coord),
                    "field {coord} allocated to {holder} but absent from its path"
                );
            }
        }
    }

    #[test]
    fn single_agent_commits_directly() {
        let allocator = Allocator::new();
        let mut env = open_env();
        let mut agents = AgentRegistry::new();
        let agent = agent_between("solo", 100.0, (0, 0, 0, 0), (3, 0, 0, 3));
        let id = agent.id;

        allocator
            .allocate_for_agent(&mut env, &mut agents, agent)
            .unwrap();

        assert!(env.is_active(id));
        let path = agents.get(&id).unwrap().allocated_path.clone().unwrap();
        assert_eq!(path.len(), 4);
        assert!(path.is_time_ordered());
        for cell in &path {
            assert_eq!(env.allocated_to(*cell), Some(id));
        }
        assert_exclusive(&env, &agents);
    }

    #[test]
    fn multi_waypoint_path_joins_segments() {
        let allocator = Allocator::new();
        let mut env = open_env();
        let mut agents = AgentRegistry::new();
        let agent = Agent::new(
            "tour",
            100.0,
            vec![
                PointOfInterest::new(Coordinate::new(0, 0, 0), 0),
                PointOfInterest::new(Coordinate::new(2, 0, 0), 2),
                PointOfInterest::new(Coordinate::new(2, 2, 0), 4),
            ],
        );
        let id = agent.id;

        allocator
            .allocate_for_agent(&mut env, &mut agents, agent)
            .unwrap();

        let path = agents.get(&id).unwrap().allocated_path.clone().unwrap();
        // Two segments of two steps each share a joint cell: five cells.
        assert_eq!(path.len(), 5);
        assert!(path.is_time_ordered());
        assert!(path.contains(&TimeCoordinate::new(2, 0, 0, 2)));
        assert!(path.contains(&TimeCoordinate::new(2, 2, 0, 4)));
        assert_exclusive(&env, &agents);
    }

    #[test]
    fn richer_newcomer_displaces_incumbent() {
        let allocator = Allocator::new();
        let mut env = Environment::new(Coordinate::new(3, 3, 1)).unwrap();
        let mut agents = AgentRegistry::new();

        let incumbent = agent_between("incumbent", 50.0, (0, 1, 0, 0), (2, 1, 0, 2));
        let incumbent_id = incumbent.id;
        allocator
            .allocate_for_agent(&mut env, &mut agents, incumbent)
            .unwrap();

        let contested = TimeCoordinate::new(1, 1, 0, 1);
        assert_eq!(env.allocated_to(contested), Some(incumbent_id));

        let newcomer = agent_between("newcomer", 100.0, (1, 0, 0, 0), (1, 2, 0, 2));
        let newcomer_id = newcomer.id;
        allocator
            .allocate_for_agent(&mut env, &mut agents, newcomer)
            .unwrap();

        // The richer newcomer takes the crossing cell; the incumbent is
        // rerouted off it.
        assert_eq!(env.allocated_to(contested), Some(newcomer_id));
        let incumbent_path = agents
            .get(&incumbent_id)
            .unwrap()
            .allocated_path
            .clone()
            .unwrap();
        assert!(!incumbent_path.contains(&contested));
        assert_exclusive(&env, &agents);
    }

    #[test]
    fn poorer_newcomer_detours_around_incumbent() {
        let allocator = Allocator::new();
        let mut env = Environment::new(Coordinate::new(3, 3, 1)).unwrap();
        let mut agents = AgentRegistry::new();

        let incumbent = agent_between("incumbent", 100.0, (0, 1, 0, 0), (2, 1, 0, 2));
        let incumbent_id = incumbent.id;
        allocator
            .allocate_for_agent(&mut env, &mut agents, incumbent)
            .unwrap();
        let standing = agents
            .get(&incumbent_id)
            .unwrap()
            .allocated_path
            .clone()
            .unwrap();

        let contested = TimeCoordinate::new(1, 1, 0, 1);
        let newcomer = agent_between("newcomer", 50.0, (1, 0, 0, 0), (1, 2, 0, 2));
        let newcomer_id = newcomer.id;
        allocator
            .allocate_for_agent(&mut env, &mut agents, newcomer)
            .unwrap();

        // The incumbent keeps both the cell and its exact path.
        assert_eq!(env.allocated_to(contested), Some(incumbent_id));
        assert_eq!(
            agents.get(&incumbent_id).unwrap().allocated_path,
            Some(standing)
        );
        let newcomer_path = agents
            .get(&newcomer_id)
            .unwrap()
            .allocated_path
            .clone()
            .unwrap();
        assert!(!newcomer_path.contains(&contested));
        assert_exclusive(&env, &agents);
    }

    #[test]
    fn equal_welfare_keeps_the_incumbent() {
        let allocator = Allocator::new();
        let mut env = Environment::new(Coordinate::new(3, 3, 1)).unwrap();
        let mut agents = AgentRegistry::new();

        let incumbent = agent_between("incumbent", 100.0, (0, 1, 0, 0), (2, 1, 0, 2));
        let incumbent_id = incumbent.id;
        allocator
            .allocate_for_agent(&mut env, &mut agents, incumbent)
            .unwrap();

        let contested = TimeCoordinate::new(1, 1, 0, 1);
        let newcomer = agent_between("newcomer", 100.0, (1, 0, 0, 0), (1, 2, 0, 2));
        allocator
            .allocate_for_agent(&mut env, &mut agents, newcomer)
            .unwrap();

        // Identical stakes: the tie goes to the standing allocation.
        assert_eq!(env.allocated_to(contested), Some(incumbent_id));
        assert_exclusive(&env, &agents);
    }

    #[test]
    fn failed_admission_leaves_no_trace() {
        let allocator = Allocator::new();
        let mut env = open_env();
        let mut agents = AgentRegistry::new();

        // The goal location does not exist, so routing must fail.
        let agent = agent_between("lost", 100.0, (0, 0, 0, 0), (50, 0, 0, 3));
        let id = agent.id;
        let before = env.clone();

        let result = allocator.allocate_for_agent(&mut env, &mut agents, agent);
        assert!(matches!(result, Err(CoreError::NoRoute { .. })));
        assert!(!agents.contains_key(&id));
        assert_eq!(env, before);
    }

    #[test]
    fn single_waypoint_is_rejected() {
        let allocator = Allocator::new();
        let mut env = open_env();
        let mut agents = AgentRegistry::new();
        let agent = Agent::new(
            "stationary",
            10.0,
            vec![PointOfInterest::new(Coordinate::new(1, 1, 0), 0)],
        );

        let result = allocator.allocate_for_agent(&mut env, &mut agents, agent);
        assert!(matches!(result, Err(CoreError::EmptyDesiredPath { .. })));
    }
}
