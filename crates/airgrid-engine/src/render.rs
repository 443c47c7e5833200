//! ASCII rendering of the grid at a single tick.
//!
//! One block per altitude layer: a header row of x indices, then one
//! row per y line. Cells show the first letter of the holding agent's
//! name, `x` for blocked cells, and `.` for free ones.

use airgrid_core::AgentRegistry;
use airgrid_types::TimeCoordinate;
use airgrid_world::Environment;

/// Render every altitude layer of the grid at the given tick.
pub fn render_grid(env: &Environment, tick: u64, agents: &AgentRegistry) -> String {
    let dimension = env.dimension();
    let mut out = format!("t = {tick}\n");

    for z in 0..dimension.z {
        out.push_str(&format!("z={z:>2}  "));
        for x in 0..dimension.x {
            out.push_str(&format!("{x:>2} "));
        }
        out.push_str(" -> x\n");

        for y in 0..dimension.y {
            out.push_str(&format!("  {y:>2}  "));
            for x in 0..dimension.x {
                let cell = TimeCoordinate::new(x, y, z, tick);
                out.push_str(&format!("{:>2} ", cell_glyph(env, cell, agents)));
            }
            out.push('\n');
        }
        out.push('\n');
    }
    out.push_str(" |\n v y\n");
    out
}

/// The glyph for one cell: holder initial, `x` for blocked, `.` free.
fn cell_glyph(env: &Environment, cell: TimeCoordinate, agents: &AgentRegistry) -> char {
    if let Some(holder) = env.allocated_to(cell) {
        return agents
            .get(&holder)
            .and_then(|agent| agent.name.chars().next())
            .unwrap_or('?');
    }
    if env.is_blocked(cell) {
        return 'x';
    }
    '.'
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use airgrid_agents::{Agent, PointOfInterest};
    use airgrid_types::Coordinate;

    use super::*;

    #[test]
    fn renders_one_row_per_y_line() {
        let env = Environment::new(Coordinate::new(4, 3, 1)).unwrap();
        let agents = AgentRegistry::new();
        let grid = render_grid(&env, 0, &agents);

        assert!(grid.contains("t = 0"));
        assert!(grid.contains("z= 0"));
        // One dotted row per y line of the empty 4x3x1 grid.
        let rows = grid.lines().filter(|line| line.contains('.')).count();
        assert_eq!(rows, 3);
    }

    #[test]
    fn allocated_cell_shows_holder_initial() {
        let mut env = Environment::new(Coordinate::new(4, 3, 1)).unwrap();
        let mut agents = AgentRegistry::new();
        let agent = Agent::new(
            "Kestrel-1",
            100.0,
            vec![PointOfInterest::new(Coordinate::new(0, 0, 0), 0)],
        );
        let id = agent.id;
        agents.insert(id, agent);
        env.field_at_mut(TimeCoordinate::new(2, 1, 0, 5)).allocated_to = Some(id);

        let grid = render_grid(&env, 5, &agents);
        assert!(grid.contains('K'));
    }

    #[test]
    fn free_grid_is_dots() {
        let env = Environment::new(Coordinate::new(3, 3, 1)).unwrap();
        let agents = AgentRegistry::new();
        let grid = render_grid(&env, 2, &agents);
        assert!(grid.contains('.'));
        assert!(!grid.contains('x'));
    }
}
