//! Owners: the population processes that inject agents into the grid.
//!
//! Each owner has a quota of agents to inject over the run. On each
//! tick it rolls how many arrive now (most ticks none, sometimes one or
//! two) and builds each newcomer with randomly placed waypoints. Tick
//! spacing between consecutive waypoints is reachability-aware: the
//! next waypoint's tick is the previous tick plus the Manhattan
//! distance plus a little random slack, so desired paths are flyable in
//! principle.

use airgrid_agents::{Agent, PointOfInterest};
use airgrid_types::{Coordinate, OwnerId, Tick};
use rand::Rng;
use tracing::info;

use crate::config::OwnersConfig;

/// Revenue of every generated agent. Economic variety comes from
/// waypoint placement; revenue differentiation is an experiment knob.
const AGENT_REVENUE: f64 = 100.0;

/// How many agents arrive on a given tick: mostly none, sometimes one,
/// occasionally two.
const ARRIVALS_PER_TICK: [u32; 8] = [0, 0, 0, 1, 1, 1, 2, 2];

/// Latest tick offset for an agent's first waypoint.
const MAX_START_DELAY: u64 = 10;

/// Largest random slack added between consecutive waypoints.
const MAX_WAYPOINT_SLACK: u64 = 5;

/// Most waypoints an agent requests beyond its starting point.
const MAX_EXTRA_WAYPOINTS: u32 = 5;

/// Built-in pool of owner callsigns.
const CALLSIGNS: &[&str] = &[
    "Albatross", "Bobcat", "Condor", "Dragonfly", "Egret", "Falcon",
    "Gannet", "Harrier", "Ibis", "Jackdaw", "Kestrel", "Lapwing",
    "Magpie", "Nighthawk", "Osprey", "Petrel", "Quail", "Raptor",
    "Swift", "Tern",
];

/// A population process injecting agents under a fixed quota.
#[derive(Debug, Clone)]
pub struct Owner {
    /// Unique identity.
    pub id: OwnerId,
    /// Callsign used to name this owner's agents.
    pub name: String,
    /// Total number of agents this owner may inject.
    pub quota: u32,
    /// Number of agents injected so far.
    pub spawned: u32,
}

impl Owner {
    /// Create an owner with a callsign and an injection quota.
    pub fn new(name: impl Into<String>, quota: u32) -> Self {
        Self {
            id: OwnerId::new(),
            name: name.into(),
            quota,
            spawned: 0,
        }
    }

    /// Generate this tick's arrivals: zero or more agents with random
    /// waypoints inside the given grid dimension.
    pub fn generate_agents(
        &mut self,
        now: Tick,
        dimension: Coordinate,
        rng: &mut impl Rng,
    ) -> Vec<Agent> {
        let roll = ARRIVALS_PER_TICK
            .get(rng.random_range(0..ARRIVALS_PER_TICK.len()))
            .copied()
            .unwrap_or(0);
        let remaining = self.quota.saturating_sub(self.spawned);
        let count = roll.min(remaining);

        let mut arrivals = Vec::new();
        for _ in 0..count {
            self.spawned = self.spawned.saturating_add(1);
            let name = format!("{}-{}", self.name, self.spawned);
            let agent = random_agent(&name, now, dimension, rng);
            info!(
                owner = %self.id,
                agent = %agent.id,
                name = name,
                waypoints = agent.points_of_interest().len(),
                "agent generated"
            );
            arrivals.push(agent);
        }
        arrivals
    }
}

/// Create the owner population for a run.
pub fn seed_owners(config: &OwnersConfig, rng: &mut impl Rng) -> Vec<Owner> {
    let mut owners = Vec::new();
    for i in 0..config.count {
        let callsign = CALLSIGNS
            .get(rng.random_range(0..CALLSIGNS.len()))
            .copied()
            .unwrap_or("Drone");
        // Suffix keeps callsigns unique even when the pool repeats.
        let name = format!("{callsign}{i}");
        owners.push(Owner::new(name, config.quota));
    }
    owners
}

/// Build one agent with a random waypoint tour.
fn random_agent(
    name: &str,
    now: Tick,
    dimension: Coordinate,
    rng: &mut impl Rng,
) -> Agent {
    let first_location = random_cell(dimension, rng);
    let first_tick = now.saturating_add(rng.random_range(0..=MAX_START_DELAY));
    let mut waypoints = vec![PointOfInterest::new(first_location, first_tick)];

    let extra = rng.random_range(1..=MAX_EXTRA_WAYPOINTS);
    for _ in 0..extra {
        let previous = match waypoints.last() {
            Some(poi) => (poi.location, poi.tick),
            None => (first_location, first_tick),
        };
        let location = random_cell(dimension, rng);
        let distance = (location - previous.0).l1().unsigned_abs();
        let tick = previous
            .1
            .saturating_add(distance)
            .saturating_add(rng.random_range(0..=MAX_WAYPOINT_SLACK));
        waypoints.push(PointOfInterest::new(location, tick));
    }

    Agent::new(name, AGENT_REVENUE, waypoints)
}

/// A uniformly random in-bounds spatial cell.
fn random_cell(dimension: Coordinate, rng: &mut impl Rng) -> Coordinate {
    Coordinate::new(
        rng.random_range(0..dimension.x.max(1)),
        rng.random_range(0..dimension.y.max(1)),
        rng.random_range(0..dimension.z.max(1)),
    )
}
