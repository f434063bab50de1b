//! Interactive driver around [`GroupState`].

use drover_core::{Agent, AgentId, Cell, Fault, GridSpec, Timeline};
use indexmap::IndexMap;
use tracing::info;

use crate::config::{PlannerConfig, PlannerError};
use crate::state::{GroupState, Phase, TickReport};

/// Result of [`GroupSession::run`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    /// Ticks executed by this call.
    pub ticks: u64,
    /// Whether the group finished within the cap.
    pub complete: bool,
    /// Replans of the final state.
    pub replans: u32,
}

/// A grid, a group on it, and the group's history.
///
/// Every [`step`](Self::step) records the new snapshot; [`back`](Self::back)
/// rewinds without discarding, and the next step from a rewound cursor
/// drops the abandoned future. Editing the grid replans from the current
/// positions and restarts the history there.
#[derive(Clone, Debug)]
pub struct GroupSession {
    grid: GridSpec,
    config: PlannerConfig,
    history: Timeline<GroupState>,
    running: bool,
}

impl GroupSession {
    /// Validate the inputs and plan the group.
    ///
    /// Planning faults are logged by the planner and available from
    /// [`GroupState::plans`]; only malformed input is an error.
    pub fn new(
        grid: GridSpec,
        roster: &[Agent],
        config: PlannerConfig,
    ) -> Result<Self, PlannerError> {
        config.validate_for(&grid)?;
        let (initial, _) = GroupState::new(&grid, roster)?.replan(&grid, &config)?;
        Ok(Self {
            grid,
            config,
            history: Timeline::new(initial),
            running: false,
        })
    }

    /// The grid in use.
    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    /// The configuration in use.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Snapshot under the history cursor.
    pub fn state(&self) -> &GroupState {
        self.history.current()
    }

    /// Current agent positions.
    pub fn positions(&self) -> &IndexMap<AgentId, Cell> {
        self.state().positions()
    }

    /// Every snapshot recorded since the last reset.
    pub fn history(&self) -> &Timeline<GroupState> {
        &self.history
    }

    /// Execute one tick. A complete group is left as it is.
    pub fn step(&mut self) -> TickReport {
        let (next, report) = self.state().tick(&self.grid, &self.config);
        if next == *self.state() {
            self.running = false;
            return report;
        }
        if next.phase() == Phase::Complete {
            self.running = false;
        }
        self.history.record(next);
        report
    }

    /// Move to the previous snapshot. Returns `false` at the start.
    pub fn back(&mut self) -> bool {
        self.running = false;
        self.history.back().is_some()
    }

    /// Enter continuous mode.
    pub fn start(&mut self) {
        self.running = self.state().phase() != Phase::Complete;
    }

    /// Leave continuous mode.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// True in continuous mode. Stall replans do not leave it.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Step until the group completes or `cap` ticks have run.
    pub fn run(&mut self, cap: u64) -> RunOutcome {
        self.start();
        let mut ticks = 0;
        while self.running && ticks < cap {
            self.step();
            ticks += 1;
        }
        self.stop();
        let state = self.state();
        let complete = state.phase() == Phase::Complete;
        info!(ticks, complete, replans = state.replans(), "run finished");
        RunOutcome {
            ticks,
            complete,
            replans: state.replans(),
        }
    }

    /// Replace the barrier set and replan from the current positions.
    pub fn set_barriers(
        &mut self,
        barriers: impl IntoIterator<Item = Cell>,
    ) -> Result<Vec<Fault>, PlannerError> {
        let grid = GridSpec::new(self.grid.size())?
            .with_barriers(barriers)?
            .with_destinations(self.grid.destinations().iter().copied())?;
        self.apply(grid)
    }

    /// Replace the destination set and replan from the current positions.
    pub fn set_destinations(
        &mut self,
        destinations: impl IntoIterator<Item = Cell>,
    ) -> Result<Vec<Fault>, PlannerError> {
        let grid = GridSpec::new(self.grid.size())?
            .with_barriers(self.grid.barriers().iter().copied())?
            .with_destinations(destinations)?;
        self.apply(grid)
    }

    fn apply(&mut self, grid: GridSpec) -> Result<Vec<Fault>, PlannerError> {
        self.config.validate_for(&grid)?;
        let roster: Vec<Agent> = self
            .positions()
            .iter()
            .map(|(&id, &position)| Agent { id, position })
            .collect();
        let (next, faults) = GroupState::new(&grid, &roster)?.replan(&grid, &self.config)?;
        info!(
            barriers = grid.barriers().len(),
            destinations = grid.destinations().len(),
            "grid edited, replanned"
        );
        self.grid = grid;
        self.history.reset(next);
        Ok(faults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drover_core::GridError;

    fn c(x: i32, y: i32) -> Cell {
        Cell::new(x, y)
    }

    fn session() -> GroupSession {
        let grid = GridSpec::new(5)
            .unwrap()
            .with_destinations([c(4, 0), c(4, 4)])
            .unwrap();
        GroupSession::new(
            grid,
            &[Agent::new(0, (0, 0)), Agent::new(1, (0, 4))],
            PlannerConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn step_and_back_walk_history() {
        let mut s = session();
        let start = s.positions().clone();
        s.step();
        s.step();
        assert_eq!(s.history().len(), 3);
        assert!(s.back());
        assert!(s.back());
        assert!(!s.back());
        assert_eq!(s.positions(), &start);
        s.step();
        assert_eq!(s.history().len(), 2);
    }

    #[test]
    fn run_reaches_destinations() {
        let mut s = session();
        let outcome = s.run(40);
        assert!(outcome.complete);
        assert!(outcome.ticks >= 4 && outcome.ticks <= 10);
        assert!(!s.is_running());
        assert!(s.positions().values().all(|&cell| s.grid().is_destination(cell)));
        assert_ne!(s.positions()[&AgentId(0)], s.positions()[&AgentId(1)]);
        let len = s.history().len();
        s.step();
        assert_eq!(s.history().len(), len);
    }

    #[test]
    fn barrier_edit_resets_history() {
        let mut s = session();
        s.step();
        let here = s.positions().clone();
        s.set_barriers([c(2, 2)]).unwrap();
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.positions(), &here);
        assert!(s.grid().is_barrier(c(2, 2)));
    }

    #[test]
    fn barrier_on_agent_rejected() {
        let mut s = session();
        let err = s.set_barriers([c(0, 0)]).unwrap_err();
        assert!(matches!(
            err,
            PlannerError::Grid(GridError::AgentOnBarrier { .. })
        ));
        assert!(!s.grid().is_barrier(c(0, 0)));
    }

    #[test]
    fn destination_count_must_match() {
        let mut s = session();
        assert!(s.set_destinations([c(4, 2)]).is_err());
    }
}
