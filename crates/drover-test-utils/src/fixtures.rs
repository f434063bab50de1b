//! The reference scenario: 20 agents on the bottom two rows of a 10x10
//! grid, targeting a 20-cell formation centred at `(5, 5)`.

use drover_core::{shape, Agent, AgentId, Cell, GridSpec, Shape};
use indexmap::IndexMap;

/// Side length of the reference grid.
pub const REFERENCE_SIZE: u32 = 10;

/// Barrier-free 10x10 grid targeting `shape`.
pub fn reference_grid(shape: Shape) -> GridSpec {
    GridSpec::new(REFERENCE_SIZE)
        .and_then(|g| g.with_destinations(shape.cells(REFERENCE_SIZE)))
        .expect("reference grid is valid")
}

/// Twenty agents on rows 8 and 9.
pub fn reference_roster() -> Vec<Agent> {
    shape::bottom_rows(REFERENCE_SIZE, 2)
}

/// Roster as an id-to-cell map, roster order preserved.
pub fn positions(agents: &[Agent]) -> IndexMap<AgentId, Cell> {
    agents.iter().map(|a| (a.id, a.position)).collect()
}
