//! Agent-to-destination matching on timed path costs.

use drover_core::{AgentId, Cell, Fault, GridSpec};
use drover_path::{ticks, Reservations, TimedSearch};
use drover_space::Square8;
use indexmap::IndexMap;
use tracing::debug;

use crate::hungarian::{solve, AssignError, CostMatrix};

/// Cost used for agent/destination pairs with no route.
///
/// Far above any real path length on a supported grid, so an unreachable
/// pair is only chosen when nothing better remains.
pub const UNREACHABLE_COST: i64 = 100_000;

/// Result of one assignment round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    /// Destination for each agent, in the caller's agent order.
    pub by_agent: IndexMap<AgentId, Cell>,
    /// Sum of the matched costs, sentinels included.
    pub total_cost: i64,
    /// One [`Fault::AssignmentUnreachable`] per forced sentinel pair.
    pub faults: Vec<Fault>,
}

/// `cost[d][a]`: ticks for agent `a` to reach destination `d` with no
/// reservations, or `unreachable_cost`.
pub fn cost_matrix(
    grid: &GridSpec,
    agents: &IndexMap<AgentId, Cell>,
    destinations: &[Cell],
    unreachable_cost: i64,
) -> CostMatrix {
    let search = TimedSearch::new(Square8::of(grid), grid);
    let empty = Reservations::new();
    let mut matrix = CostMatrix::filled(destinations.len(), agents.len(), unreachable_cost);
    for (d, &goal) in destinations.iter().enumerate() {
        for (a, &start) in agents.values().enumerate() {
            if let Some(path) = search.plan(start, goal, 0, &empty) {
                matrix.set(d, a, i64::from(ticks(&path)));
            }
        }
    }
    matrix
}

/// Match every agent to one of the grid's destinations at minimum total cost.
///
/// Agent and destination counts must be equal.
pub fn assign(
    grid: &GridSpec,
    agents: &IndexMap<AgentId, Cell>,
    unreachable_cost: i64,
) -> Result<Assignment, AssignError> {
    let destinations: Vec<Cell> = grid.destinations().iter().copied().collect();
    let matrix = cost_matrix(grid, agents, &destinations, unreachable_cost);
    let matching = solve(&matrix)?;

    let ids: Vec<AgentId> = agents.keys().copied().collect();
    let mut by_agent: IndexMap<AgentId, Cell> = IndexMap::with_capacity(ids.len());
    let mut faults = Vec::new();
    let mut total_cost = 0;
    // Rows are destinations, columns are agents.
    let mut dest_of_agent = vec![0usize; ids.len()];
    for (d, &a) in matching.iter().enumerate() {
        dest_of_agent[a] = d;
    }
    for (a, &id) in ids.iter().enumerate() {
        let d = dest_of_agent[a];
        let cost = matrix.get(d, a);
        total_cost += cost;
        if cost >= unreachable_cost {
            debug!(agent = %id, destination = %destinations[d], "assigned unreachable destination");
            faults.push(Fault::AssignmentUnreachable {
                agent: id,
                destination: destinations[d],
            });
        }
        by_agent.insert(id, destinations[d]);
    }
    Ok(Assignment {
        by_agent,
        total_cost,
        faults,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: i32, y: i32) -> Cell {
        Cell::new(x, y)
    }

    fn positions(cells: &[(u32, Cell)]) -> IndexMap<AgentId, Cell> {
        cells.iter().map(|&(id, cell)| (AgentId(id), cell)).collect()
    }

    #[test]
    fn crossing_pairs_are_uncrossed() {
        let grid = GridSpec::new(10)
            .unwrap()
            .with_destinations([c(0, 5), c(9, 5)])
            .unwrap();
        let agents = positions(&[(0, c(9, 0)), (1, c(0, 0))]);
        let result = assign(&grid, &agents, UNREACHABLE_COST).unwrap();
        assert_eq!(result.by_agent[&AgentId(0)], c(9, 5));
        assert_eq!(result.by_agent[&AgentId(1)], c(0, 5));
        assert_eq!(result.total_cost, 10);
        assert!(result.faults.is_empty());
    }

    #[test]
    fn walled_destination_reports_fault() {
        let grid = GridSpec::new(4)
            .unwrap()
            .with_barriers([c(2, 0), c(2, 1), c(2, 2), c(2, 3)])
            .unwrap()
            .with_destinations([c(0, 0), c(3, 3)])
            .unwrap();
        let agents = positions(&[(4, c(0, 3)), (5, c(1, 3))]);
        let result = assign(&grid, &agents, UNREACHABLE_COST).unwrap();
        assert_eq!(result.faults.len(), 1);
        assert!(result.total_cost >= UNREACHABLE_COST);
        assert_eq!(result.by_agent.len(), 2);
    }

    #[test]
    fn count_mismatch_is_rejected() {
        let grid = GridSpec::new(4).unwrap().with_destinations([c(0, 0)]).unwrap();
        let agents = positions(&[(0, c(1, 1)), (1, c(2, 2))]);
        assert_eq!(
            assign(&grid, &agents, UNREACHABLE_COST),
            Err(AssignError::NotSquare { rows: 1, cols: 2 })
        );
    }
}
