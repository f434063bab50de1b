//! One planning pass: assignment, then prioritised timed search.

use drover_assign::assign;
use drover_core::{AgentId, Cell, Fault, GridSpec};
use drover_path::{Reservations, TimedPath, TimedSearch};
use drover_space::Square8;
use indexmap::IndexMap;
use tracing::debug;

use crate::config::{PlannerConfig, PlannerError};

/// How an agent's path was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PathSource {
    /// Found against the shared reservation table.
    Reserved,
    /// Found only by ignoring other agents' reservations.
    Unconstrained,
    /// No route at all; the agent holds its start cell.
    Hold,
}

/// One agent's plan and its progress along it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentPlan {
    /// Assigned destination.
    pub destination: Cell,
    /// Cell per planned tick, starting with the start cell and padded with
    /// the final cell through the horizon.
    pub path: Vec<Cell>,
    /// Index into `path` of the agent's current cell.
    pub cursor: usize,
    /// Which search produced `path`.
    pub source: PathSource,
}

impl AgentPlan {
    /// The cell the agent wants next; its final cell once the path is spent.
    pub fn next_cell(&self) -> Option<Cell> {
        self.path
            .get(self.cursor + 1)
            .or_else(|| self.path.last())
            .copied()
    }

    /// True once the cursor sits on the last planned cell.
    pub fn is_spent(&self) -> bool {
        self.cursor + 1 >= self.path.len()
    }
}

/// Output of [`plan_group`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupPlan {
    /// Plan per agent, in the order agents were given.
    pub plans: IndexMap<AgentId, AgentPlan>,
    /// Sum of assignment costs.
    pub total_cost: i64,
    /// Sentinel assignments and agents left holding.
    pub faults: Vec<Fault>,
}

/// Assign destinations to `positions` and route every agent.
///
/// Agents are routed in map order against one reservation table. Every
/// start is reserved at tick 0 before the first search. An agent whose
/// reserved search fails retries without reservations and then falls
/// back to holding its cell for two ticks. Each path's final cell is
/// reserved through `config.horizon`.
pub fn plan_group(
    grid: &GridSpec,
    positions: &IndexMap<AgentId, Cell>,
    config: &PlannerConfig,
) -> Result<GroupPlan, PlannerError> {
    let assignment = assign(grid, positions, config.unreachable_cost)?;
    let mut faults = assignment.faults;

    let search = TimedSearch::new(Square8::of(grid), grid);
    let unconstrained = Reservations::new();
    let mut reserved = Reservations::new();
    for &start in positions.values() {
        reserved.reserve(start, 0);
    }

    let mut plans = IndexMap::with_capacity(positions.len());
    for (&id, &start) in positions {
        let Some(&destination) = assignment.by_agent.get(&id) else {
            continue;
        };
        let (raw, source) = match search.plan(start, destination, 0, &reserved) {
            Some(path) => (path, PathSource::Reserved),
            None => match search.plan(start, destination, 0, &unconstrained) {
                Some(path) => {
                    debug!(agent = %id, %start, %destination, "reserved search failed, planning through reservations");
                    (path, PathSource::Unconstrained)
                }
                None => {
                    debug!(agent = %id, %start, %destination, "no route, holding");
                    faults.push(Fault::PathNotFound {
                        from: start,
                        to: destination,
                    });
                    (vec![(start, 0), (start, 1)], PathSource::Hold)
                }
            },
        };
        let path = pad_and_reserve(&raw, config.horizon, &mut reserved);
        plans.insert(
            id,
            AgentPlan {
                destination,
                path,
                cursor: 0,
                source,
            },
        );
    }

    Ok(GroupPlan {
        plans,
        total_cost: assignment.total_cost,
        faults,
    })
}

fn pad_and_reserve(raw: &TimedPath, horizon: u32, reserved: &mut Reservations) -> Vec<Cell> {
    reserved.reserve_path(raw);
    let mut path: Vec<Cell> = raw.iter().map(|&(cell, _)| cell).collect();
    if let Some(&(last, t)) = raw.last() {
        for _ in t + 1..=horizon {
            path.push(last);
        }
        if t < horizon {
            reserved.park(last, t + 1, horizon);
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use drover_core::Agent;

    fn c(x: i32, y: i32) -> Cell {
        Cell::new(x, y)
    }

    fn roster(agents: &[Agent]) -> IndexMap<AgentId, Cell> {
        agents.iter().map(|a| (a.id, a.position)).collect()
    }

    #[test]
    fn paths_are_padded_to_horizon() {
        let grid = GridSpec::new(5)
            .unwrap()
            .with_destinations([c(2, 0)])
            .unwrap();
        let plan = plan_group(&grid, &roster(&[Agent::new(0, (0, 0))]), &PlannerConfig::default())
            .unwrap();
        let p = &plan.plans[&AgentId(0)];
        assert_eq!(p.source, PathSource::Reserved);
        assert_eq!(p.path.len(), 21);
        assert_eq!(p.path[2], c(2, 0));
        assert_eq!(p.path[20], c(2, 0));
        assert_eq!(p.next_cell(), Some(c(1, 0)));
    }

    #[test]
    fn later_agent_avoids_earlier_reservations() {
        let grid = GridSpec::new(3)
            .unwrap()
            .with_destinations([c(1, 0), c(2, 0)])
            .unwrap();
        let agents = [Agent::new(0, (1, 1)), Agent::new(1, (0, 0))];
        let plan = plan_group(&grid, &roster(&agents), &PlannerConfig::default()).unwrap();
        let first = &plan.plans[&AgentId(0)];
        let second = &plan.plans[&AgentId(1)];
        for t in 0..=20 {
            assert_ne!(first.path[t], second.path[t], "vertex conflict at t={t}");
        }
        assert!(plan.faults.is_empty());
    }

    #[test]
    fn walled_off_agent_holds() {
        let grid = GridSpec::new(3)
            .unwrap()
            .with_barriers([c(1, 0), c(1, 1), c(1, 2)])
            .unwrap()
            .with_destinations([c(2, 2)])
            .unwrap();
        let plan = plan_group(&grid, &roster(&[Agent::new(9, (0, 0))]), &PlannerConfig::default())
            .unwrap();
        let p = &plan.plans[&AgentId(9)];
        assert_eq!(p.source, PathSource::Hold);
        assert!(p.path.iter().all(|&cell| cell == c(0, 0)));
        assert_eq!(plan.faults.len(), 2);
    }
}
