//! Agents: identity, economics, waypoints, and trajectory valuation.

use airgrid_types::{AgentId, Tick, TravelPath};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interest::PointOfInterest;
use crate::value::TemporalValueFunction;

/// Default movement speed: ticks consumed per lattice step.
pub const DEFAULT_SPEED: Tick = 1;

/// Default flight-time window in ticks. Past this the battery is dead
/// and any trajectory is worthless.
pub const DEFAULT_FLIGHT_WINDOW: f64 = 30.0;

/// A mobile agent (drone) seeking admission to the grid.
///
/// The desired path is an ordered sequence of [`PointOfInterest`]
/// waypoints. `allocated_path` is the trajectory currently granted;
/// only the allocator writes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Unique identity.
    pub id: AgentId,
    /// Display name, used by logs and the grid renderer.
    pub name: String,
    /// Revenue earned by a perfectly satisfied trajectory.
    pub revenue: f64,
    /// Opportunity cost of flying at all. Reserved for future welfare
    /// formulas; carried but not yet read.
    pub opportunity_cost: f64,
    /// Risk aversion. Reserved for future welfare formulas; carried but
    /// not yet read.
    pub risk_aversion: f64,
    /// Ticks consumed per lattice step.
    pub speed: Tick,
    /// Ordered waypoints the agent wants to visit.
    points_of_interest: Vec<PointOfInterest>,
    /// The trajectory currently granted by the allocator, if any.
    pub allocated_path: Option<TravelPath>,
    /// Value of total flight time: 1.0 inside the permitted window,
    /// 0.0 outside -- a trajectory that overstays is worthless no
    /// matter how well it fits elsewhere.
    flight_time_value: TemporalValueFunction,
    /// When the agent entered the simulation.
    pub created_at: DateTime<Utc>,
}

impl Agent {
    /// Create an agent with default speed and flight window.
    pub fn new(
        name: impl Into<String>,
        revenue: f64,
        points_of_interest: Vec<PointOfInterest>,
    ) -> Self {
        Self {
            id: AgentId::new(),
            name: name.into(),
            revenue,
            opportunity_cost: 0.0,
            risk_aversion: 0.0,
            speed: DEFAULT_SPEED,
            points_of_interest,
            allocated_path: None,
            flight_time_value: TemporalValueFunction::range(0, DEFAULT_FLIGHT_WINDOW),
            created_at: Utc::now(),
        }
    }

    /// Replace the permitted flight-time window (in ticks).
    pub fn set_flight_window(&mut self, window: f64) {
        self.flight_time_value = TemporalValueFunction::range(0, window);
    }

    /// The agent's ordered waypoints.
    pub fn points_of_interest(&self) -> &[PointOfInterest] {
        &self.points_of_interest
    }

    /// Candidate desired paths, most preferred first. The allocator
    /// routes the first candidate; alternatives are a future extension.
    pub fn calculate_desired_path(&self) -> Vec<Vec<PointOfInterest>> {
        vec![self.points_of_interest.clone()]
    }

    /// Score a trajectory: the product over all waypoints of each
    /// waypoint's best-instant match, scaled by revenue and gated by the
    /// flight-time window. An empty path is worth 0.0.
    pub fn value_of_path(&self, path: &TravelPath) -> f64 {
        if path.is_empty() {
            return 0.0;
        }
        let fit: f64 = self
            .points_of_interest
            .iter()
            .map(|poi| poi.value_of_path(path))
            .product();
        let airtime = self.flight_time_value.evaluate(path.flight_time());
        fit * self.revenue * airtime
    }
}
