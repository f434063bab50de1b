//! Capped run loop with history.

use drover_core::{Agent, AgentId, Cell, GridSpec, Timeline};
use indexmap::IndexMap;
use tracing::info;

use crate::config::{PeelConfig, PeelError};
use crate::state::PeelState;
use crate::tick::PeelReport;

/// Result of [`PeelRun::run`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeelOutcome {
    /// Ticks executed by this call.
    pub ticks: u64,
    /// Whether the run converged within the cap.
    pub converged: bool,
    /// Agents locked at the end.
    pub locked: usize,
}

/// A peeling run over a fixed grid.
///
/// The grid cannot change once the run has started; edit the grid and
/// start a new run instead.
#[derive(Clone, Debug)]
pub struct PeelRun {
    grid: GridSpec,
    config: PeelConfig,
    history: Timeline<PeelState>,
}

impl PeelRun {
    /// Validate the inputs and set up the chain.
    pub fn new(grid: GridSpec, roster: &[Agent], config: PeelConfig) -> Result<Self, PeelError> {
        config.validate()?;
        let initial = PeelState::start(&grid, roster)?;
        Ok(Self {
            grid,
            config,
            history: Timeline::new(initial),
        })
    }

    /// The grid in use.
    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    /// Snapshot under the history cursor.
    pub fn state(&self) -> &PeelState {
        self.history.current()
    }

    /// Current agent positions.
    pub fn positions(&self) -> &IndexMap<AgentId, Cell> {
        self.state().positions()
    }

    /// Every recorded snapshot.
    pub fn history(&self) -> &Timeline<PeelState> {
        &self.history
    }

    /// Execute one tick. Unchanged states are not recorded.
    pub fn step(&mut self) -> PeelReport {
        let (next, report) = self.state().tick(&self.grid);
        if next != *self.state() {
            self.history.record(next);
        }
        report
    }

    /// Move to the previous snapshot. Returns `false` at the start.
    pub fn back(&mut self) -> bool {
        self.history.back().is_some()
    }

    /// Step until converged or `config.tick_cap` ticks have run.
    pub fn run(&mut self) -> PeelOutcome {
        let mut ticks = 0;
        while !self.state().is_converged() && ticks < self.config.tick_cap {
            self.step();
            ticks += 1;
        }
        let state = self.state();
        let outcome = PeelOutcome {
            ticks,
            converged: state.is_converged(),
            locked: state.locked().len(),
        };
        info!(
            ticks = outcome.ticks,
            converged = outcome.converged,
            locked = outcome.locked,
            "peeling run finished"
        );
        outcome
    }
}
