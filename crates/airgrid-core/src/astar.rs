//! Lattice A*: minimum-step routes through the spatiotemporal grid.
//!
//! The search runs over 4D nodes `(x, y, z, t)`. A node's successors
//! either wait in place or move to one of the six orthogonal spatial
//! neighbors, in both cases advancing `t` by the agent's speed -- time
//! only moves forward, so the lattice is a DAG and revisiting a spatial
//! cell at a later tick is a distinct node.
//!
//! The heuristic is the spatial Manhattan distance plus the absolute
//! tick difference to the goal. The open list is kept fully sorted by
//! `f = g + h` with a stable sort, so ties break by insertion order.
//!
//! Search effort is capped at [`MAX_EXPANSIONS`] node expansions.
//! Hitting the cap or draining the open list is an ordinary "no route"
//! outcome reported as `None`; the caller decides how much of a problem
//! that is.

use std::collections::BTreeSet;

use airgrid_types::{AgentId, Tick, TimeCoordinate};
use airgrid_world::Environment;
use tracing::trace;

/// Hard cap on node expansions per search.
pub const MAX_EXPANSIONS: usize = 200;

/// The six orthogonal spatial step directions.
const STEPS: [(i64, i64, i64); 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

/// Parameters of a single routing query.
///
/// The override sets let the allocator explore hypothetical worlds
/// without touching the environment: `assume_free` cells are treated as
/// unallocated regardless of their actual state, `assume_blocked` cells
/// are forbidden outright. With `ignore_collisions` the search routes
/// straight through foreign allocations and leaves collision detection
/// to the caller.
#[derive(Debug, Clone, Copy)]
pub struct RouteRequest<'a> {
    /// Where the route begins.
    pub start: TimeCoordinate,
    /// Where the route must arrive: the goal location at or after the
    /// goal tick.
    pub goal: TimeCoordinate,
    /// The agent being routed; its own allocations never block it.
    pub agent: AgentId,
    /// Ticks consumed per lattice step.
    pub speed: Tick,
    /// Route through foreign allocations instead of around them.
    pub ignore_collisions: bool,
    /// Cells to treat as unallocated regardless of actual state.
    pub assume_free: &'a [TimeCoordinate],
    /// Cells to treat as forbidden regardless of actual state.
    pub assume_blocked: &'a [TimeCoordinate],
}

/// A search node in the parent-linked arena.
struct Node {
    position: TimeCoordinate,
    parent: Option<usize>,
    g: u64,
    f: u64,
}

/// Find a minimum-step route from `request.start` to the goal.
///
/// Returns the route including the start cell, or `None` if the search
/// exhausted its expansion budget or the open list without reaching the
/// goal. `None` is an ordinary outcome, not a fault.
pub fn find_route(
    request: &RouteRequest<'_>,
    env: &Environment,
) -> Option<Vec<TimeCoordinate>> {
    let mut arena: Vec<Node> = vec![Node {
        position: request.start,
        parent: None,
        g: 0,
        f: heuristic(request.start, request.goal),
    }];
    let mut open: Vec<usize> = vec![0];
    let mut closed: BTreeSet<TimeCoordinate> = BTreeSet::new();

    let mut expansions: usize = 0;
    while !open.is_empty() && expansions < MAX_EXPANSIONS {
        expansions = expansions.saturating_add(1);

        // Full stable sort before each pop: ascending f, ties in
        // insertion order.
        open.sort_by_key(|&idx| arena.get(idx).map_or(u64::MAX, |node| node.f));
        let current_idx = open.remove(0);
        let (current_pos, current_g) = match arena.get(current_idx) {
            Some(node) => (node.position, node.g),
            None => break,
        };
        closed.insert(current_pos);

        if current_pos.same_location(&request.goal) && current_pos.t >= request.goal.t {
            trace!(
                agent = %request.agent,
                expansions,
                steps = current_g,
                "route found"
            );
            return Some(reconstruct(&arena, current_idx));
        }

        for next in successors(current_pos, request.speed, env) {
            if env.is_blocked(next) {
                continue;
            }
            if request.assume_blocked.contains(&next) {
                continue;
            }
            if !request.ignore_collisions && !request.assume_free.contains(&next) {
                if let Some(holder) = env.allocated_to(next)
                    && holder != request.agent
                {
                    continue;
                }
            }
            if closed.contains(&next) {
                continue;
            }

            let g = current_g.saturating_add(1);
            let f = g.saturating_add(heuristic(next, request.goal));

            // If the cell is already on the open list, keep whichever
            // reaches it cheaper.
            let existing = open
                .iter()
                .position(|&slot| arena.get(slot).is_some_and(|node| node.position == next));
            match existing {
                Some(pos) => {
                    let worse = open
                        .get(pos)
                        .and_then(|&slot| arena.get(slot))
                        .is_some_and(|node| node.f > f);
                    if worse {
                        arena.push(Node {
                            position: next,
                            parent: Some(current_idx),
                            g,
                            f,
                        });
                        if let Some(slot) = open.get_mut(pos) {
                            *slot = arena.len().saturating_sub(1);
                        }
                    }
                }
                None => {
                    arena.push(Node {
                        position: next,
                        parent: Some(current_idx),
                        g,
                        f,
                    });
                    open.push(arena.len().saturating_sub(1));
                }
            }
        }
    }

    trace!(
        agent = %request.agent,
        expansions,
        "search exhausted without reaching the goal"
    );
    None
}

/// Spatial Manhattan distance plus absolute tick difference.
fn heuristic(from: TimeCoordinate, goal: TimeCoordinate) -> u64 {
    from.spatial_l1(&goal)
        .unsigned_abs()
        .saturating_add(from.tick_distance(&goal))
}

/// Successor cells: wait in place or step to an in-bounds orthogonal
/// neighbor, advancing time by `speed` either way.
fn successors(position: TimeCoordinate, speed: Tick, env: &Environment) -> Vec<TimeCoordinate> {
    let t = position.t.saturating_add(speed);
    let mut result = vec![TimeCoordinate::new(position.x, position.y, position.z, t)];
    for (dx, dy, dz) in STEPS {
        let next = TimeCoordinate::new(
            position.x.saturating_add(dx),
            position.y.saturating_add(dy),
            position.z.saturating_add(dz),
            t,
        );
        if env.in_bounds(next) {
            result.push(next);
        }
    }
    result
}

/// Walk parent links back from the goal node and reverse. The start
/// cell is included, so the route is self-contained.
fn reconstruct(arena: &[Node], goal_idx: usize) -> Vec<TimeCoordinate> {
    let mut path = Vec::new();
    let mut cursor = Some(goal_idx);
    while let Some(idx) = cursor {
        let Some(node) = arena.get(idx) else { break };
        path.push(node.position);
        cursor = node.parent;
    }
    path.reverse();
    path
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use airgrid_types::Coordinate;
    use airgrid_world::Blocker;

    use super::*;

    fn open_env() -> Environment {
        Environment::new(Coordinate::new(10, 10, 2)).unwrap()
    }

    fn request<'a>(
        start: TimeCoordinate,
        goal: TimeCoordinate,
        agent: AgentId,
        assume_free: &'a [TimeCoordinate],
        assume_blocked: &'a [TimeCoordinate],
    ) -> RouteRequest<'a> {
        RouteRequest {
            start,
            goal,
            agent,
            speed: 1,
            ignore_collisions: false,
            assume_free,
            assume_blocked,
        }
    }

    fn ticks_strictly_increase(route: &[TimeCoordinate]) -> bool {
        route.windows(2).all(|pair| match pair {
            [a, b] => a.t < b.t,
            _ => true,
        })
    }

    #[test]
    fn straight_route_on_open_grid() {
        let env = open_env();
        let start = TimeCoordinate::new(0, 0, 0, 0);
        let goal = TimeCoordinate::new(3, 0, 0, 3);
        let route = find_route(&request(start, goal, AgentId::new(), &[], &[]), &env).unwrap();

        // Three steps plus the start cell.
        assert_eq!(route.len(), 4);
        assert_eq!(route.first().copied(), Some(start));
        assert_eq!(route.last().copied(), Some(goal));
        assert!(ticks_strictly_increase(&route));
    }

    #[test]
    fn waits_out_a_late_deadline() {
        let env = open_env();
        let start = TimeCoordinate::new(0, 0, 0, 0);
        // Two cells away but five ticks of budget: the route must spend
        // the surplus waiting, for five steps total.
        let goal = TimeCoordinate::new(2, 0, 0, 5);
        let route = find_route(&request(start, goal, AgentId::new(), &[], &[]), &env).unwrap();

        assert_eq!(route.len(), 6);
        let last = route.last().copied().unwrap();
        assert!(last.same_location(&goal));
        assert!(last.t >= goal.t);
        assert!(ticks_strictly_increase(&route));
    }

    #[test]
    fn arrival_after_deadline_is_accepted() {
        let env = open_env();
        let start = TimeCoordinate::new(0, 0, 0, 0);
        // Spatially four steps away but the deadline is tick 1: arrival
        // happens later than the goal tick and that is fine.
        let goal = TimeCoordinate::new(2, 2, 0, 1);
        let route = find_route(&request(start, goal, AgentId::new(), &[], &[]), &env).unwrap();

        let last = route.last().copied().unwrap();
        assert!(last.same_location(&goal));
        assert!(last.t >= goal.t);
        assert_eq!(route.len(), 5);
    }

    #[test]
    fn start_satisfying_goal_returns_single_cell() {
        let env = open_env();
        let start = TimeCoordinate::new(4, 4, 0, 6);
        let goal = TimeCoordinate::new(4, 4, 0, 3);
        let route = find_route(&request(start, goal, AgentId::new(), &[], &[]), &env).unwrap();
        assert_eq!(route, vec![start]);
    }

    #[test]
    fn blocked_cells_force_a_detour() {
        let blocker = Blocker::Static {
            origin: Coordinate::new(1, 0, 0),
            size: Coordinate::new(1, 1, 2),
        };
        let env =
            Environment::with_blockers(Coordinate::new(10, 10, 2), vec![blocker]).unwrap();
        let start = TimeCoordinate::new(0, 0, 0, 0);
        let goal = TimeCoordinate::new(2, 0, 0, 4);
        let route = find_route(&request(start, goal, AgentId::new(), &[], &[]), &env).unwrap();

        assert!(route.iter().all(|cell| !env.is_blocked(*cell)));
        let last = route.last().copied().unwrap();
        assert!(last.same_location(&goal));
    }

    #[test]
    fn assume_blocked_overrides_an_open_cell() {
        let env = open_env();
        let start = TimeCoordinate::new(0, 0, 0, 0);
        let goal = TimeCoordinate::new(2, 0, 0, 2);
        let forbidden = [TimeCoordinate::new(1, 0, 0, 1)];
        let route =
            find_route(&request(start, goal, AgentId::new(), &[], &forbidden), &env).unwrap();

        assert!(!route.contains(&forbidden[0]));
        let last = route.last().copied().unwrap();
        assert!(last.same_location(&goal));
        assert!(last.t >= goal.t);
    }

    #[test]
    fn foreign_allocation_blocks_unless_ignored() {
        let mut env = open_env();
        let other = AgentId::new();
        let contested = TimeCoordinate::new(1, 0, 0, 1);
        env.field_at_mut(contested).allocated_to = Some(other);

        let start = TimeCoordinate::new(0, 0, 0, 0);
        let goal = TimeCoordinate::new(2, 0, 0, 2);
        let agent = AgentId::new();

        // Collision-avoiding search detours around the foreign cell.
        let avoiding = find_route(&request(start, goal, agent, &[], &[]), &env).unwrap();
        assert!(!avoiding.contains(&contested));

        // With ignore_collisions the route goes straight through.
        let mut through_request = request(start, goal, agent, &[], &[]);
        through_request.ignore_collisions = true;
        let through = find_route(&through_request, &env).unwrap();
        assert!(through.contains(&contested));
    }

    #[test]
    fn own_allocation_never_blocks() {
        let mut env = open_env();
        let agent = AgentId::new();
        let own = TimeCoordinate::new(1, 0, 0, 1);
        env.field_at_mut(own).allocated_to = Some(agent);

        let start = TimeCoordinate::new(0, 0, 0, 0);
        let goal = TimeCoordinate::new(2, 0, 0, 2);
        let route = find_route(&request(start, goal, agent, &[], &[]), &env).unwrap();
        assert!(route.contains(&own));
    }

    #[test]
    fn assume_free_overrides_a_foreign_allocation() {
        let mut env = open_env();
        let other = AgentId::new();
        let contested = TimeCoordinate::new(1, 0, 0, 1);
        env.field_at_mut(contested).allocated_to = Some(other);

        let start = TimeCoordinate::new(0, 0, 0, 0);
        let goal = TimeCoordinate::new(2, 0, 0, 2);
        let freed = [contested];
        let route =
            find_route(&request(start, goal, AgentId::new(), &freed, &[]), &env).unwrap();
        assert!(route.contains(&contested));
    }

    #[test]
    fn unreachable_goal_exhausts_the_budget() {
        let env = Environment::new(Coordinate::new(2, 1, 1)).unwrap();
        let start = TimeCoordinate::new(0, 0, 0, 0);
        // The goal location is outside the grid; waiting forever never
        // reaches it, so the expansion cap reports no route.
        let goal = TimeCoordinate::new(5, 0, 0, 3);
        let route = find_route(&request(start, goal, AgentId::new(), &[], &[]), &env);
        assert!(route.is_none());
    }
}
