//! The group state machine.
//!
//! A [`GroupState`] is an immutable snapshot: [`GroupState::tick`] and
//! [`GroupState::replan`] return a fresh value and never touch `self`.
//! Orchestration keeps the current value and a history of earlier ones.

use std::collections::{HashMap, HashSet};

use drover_core::{Agent, AgentId, Cell, Fault, GridSpec, TickId};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::config::{PlannerConfig, PlannerError};
use crate::plan::{plan_group, AgentPlan};

// ── Phase ──────────────────────────────────────────────────────────

/// Lifecycle of a group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Created, never planned.
    Idle,
    /// Assignment and routing in progress. Only ever seen in transitions.
    Planning,
    /// Following the current plan.
    Executing,
    /// The last tick moved nobody, or planning failed.
    Stalled,
    /// Every agent stands on a destination.
    Complete,
}

// ── TickReport ─────────────────────────────────────────────────────

/// What happened during one [`GroupState::tick`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick id of the produced state.
    pub tick: TickId,
    /// Agents whose cell changed.
    pub moved: Vec<AgentId>,
    /// Agents that wanted to move and were held in place.
    pub blocked: Vec<AgentId>,
    /// True if nobody moved this tick.
    pub stalled: bool,
    /// True if the group was replanned during the tick.
    pub replanned: bool,
    /// Phase changes in the order they happened.
    pub transitions: Vec<(Phase, Phase)>,
    /// Faults raised by any replan during the tick.
    pub faults: Vec<Fault>,
}

impl TickReport {
    fn transition(&mut self, from: Phase, to: Phase) {
        if from != to {
            self.transitions.push((from, to));
        }
    }
}

// ── GroupState ─────────────────────────────────────────────────────

/// Snapshot of a planned group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupState {
    tick: TickId,
    phase: Phase,
    positions: IndexMap<AgentId, Cell>,
    plans: IndexMap<AgentId, AgentPlan>,
    total_cost: i64,
    stall_count: u32,
    replans: u32,
}

impl GroupState {
    /// An unplanned group at the roster's positions.
    ///
    /// The roster must validate against `grid` and match its destination
    /// count one to one.
    pub fn new(grid: &GridSpec, roster: &[Agent]) -> Result<Self, PlannerError> {
        let positions = grid.validate_matching_roster(roster)?;
        Ok(Self {
            tick: TickId::default(),
            phase: Phase::Idle,
            positions,
            plans: IndexMap::new(),
            total_cost: 0,
            stall_count: 0,
            replans: 0,
        })
    }

    /// Ticks executed so far.
    pub fn tick_id(&self) -> TickId {
        self.tick
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Agent positions, in roster order.
    pub fn positions(&self) -> &IndexMap<AgentId, Cell> {
        &self.positions
    }

    /// Current plan per agent. Empty until the first plan.
    pub fn plans(&self) -> &IndexMap<AgentId, AgentPlan> {
        &self.plans
    }

    /// Assignment cost of the current plan.
    pub fn total_cost(&self) -> i64 {
        self.total_cost
    }

    /// Consecutive ticks in which nobody moved.
    pub fn stall_count(&self) -> u32 {
        self.stall_count
    }

    /// Replans after the first plan.
    pub fn replans(&self) -> u32 {
        self.replans
    }

    /// True once every agent stands on some destination of `grid`.
    pub fn is_complete(&self, grid: &GridSpec) -> bool {
        self.positions.values().all(|&cell| grid.is_destination(cell))
    }

    /// Plan from the current positions with a fresh reservation table.
    ///
    /// Returns the planned state and the faults the pass raised. The
    /// phase becomes `Executing`, or `Complete` if nothing is left to do.
    pub fn replan(
        &self,
        grid: &GridSpec,
        config: &PlannerConfig,
    ) -> Result<(Self, Vec<Fault>), PlannerError> {
        config.validate()?;
        let plan = plan_group(grid, &self.positions, config)?;
        let mut next = self.clone();
        if self.phase != Phase::Idle {
            next.replans += 1;
        }
        next.plans = plan.plans;
        next.total_cost = plan.total_cost;
        next.stall_count = 0;
        next.phase = if next.is_complete(grid) {
            Phase::Complete
        } else {
            Phase::Executing
        };
        info!(
            tick = %next.tick,
            cost = next.total_cost,
            faults = plan.faults.len(),
            "group planned"
        );
        Ok((next, plan.faults))
    }

    /// Advance the group by one tick.
    ///
    /// Unplanned and stalled groups are planned first. Each agent then
    /// asks for the next cell of its plan; agents that keep their cell
    /// hold it, and movers claim cells in roster order, first claim
    /// wins. A tick in which nobody moves counts towards
    /// `config.stall_threshold`; reaching it replans the group from the
    /// resulting positions before the tick returns.
    ///
    /// Never fails: planning errors leave the group `Stalled` and are
    /// logged.
    pub fn tick(&self, grid: &GridSpec, config: &PlannerConfig) -> (Self, TickReport) {
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };
        if self.phase == Phase::Complete {
            return (self.clone(), report);
        }

        let mut state = self.clone();
        if matches!(state.phase, Phase::Idle | Phase::Stalled) {
            report.transition(state.phase, Phase::Planning);
            match state.replan(grid, config) {
                Ok((planned, faults)) => {
                    report.replanned = true;
                    report.faults.extend(faults);
                    report.transition(Phase::Planning, planned.phase);
                    state = planned;
                }
                Err(err) => {
                    warn!(tick = %state.tick, error = %err, "planning failed");
                    report.transition(Phase::Planning, Phase::Stalled);
                    state.phase = Phase::Stalled;
                    state.tick = state.tick.next();
                    report.tick = state.tick;
                    return (state, report);
                }
            }
            if state.phase == Phase::Complete {
                return (state, report);
            }
        }

        let step = execute(grid, &state.positions, &state.plans);
        for &id in step.positions.keys() {
            if let Some(plan) = state.plans.get_mut(&id) {
                let advanced = !step.blocked.contains(&id) && !plan.is_spent();
                if advanced {
                    plan.cursor += 1;
                }
            }
        }
        state.positions = step.positions;
        state.tick = state.tick.next();
        report.tick = state.tick;
        report.moved = step.moved;
        report.blocked = step.blocked;
        for &id in &report.blocked {
            debug!(agent = %id, tick = %state.tick, "move blocked");
        }

        if state.is_complete(grid) {
            report.transition(state.phase, Phase::Complete);
            state.phase = Phase::Complete;
            state.stall_count = 0;
            info!(tick = %state.tick, replans = state.replans, "group complete");
            return (state, report);
        }

        if report.moved.is_empty() {
            report.stalled = true;
            state.stall_count += 1;
        } else {
            state.stall_count = 0;
        }

        if state.stall_count >= config.stall_threshold {
            report.transition(state.phase, Phase::Stalled);
            report.transition(Phase::Stalled, Phase::Planning);
            info!(tick = %state.tick, stalled_for = state.stall_count, "stall detected, replanning");
            state.phase = Phase::Stalled;
            match state.replan(grid, config) {
                Ok((planned, faults)) => {
                    report.replanned = true;
                    report.faults.extend(faults);
                    report.transition(Phase::Planning, planned.phase);
                    state = planned;
                }
                Err(err) => {
                    warn!(tick = %state.tick, error = %err, "replan failed");
                    report.transition(Phase::Planning, Phase::Stalled);
                }
            }
        }
        (state, report)
    }
}

// ── Executor ───────────────────────────────────────────────────────

struct Step {
    positions: IndexMap<AgentId, Cell>,
    moved: Vec<AgentId>,
    blocked: Vec<AgentId>,
}

/// Resolve one tick of simultaneous moves.
///
/// Agents that are not moving hold their own cell first. Movers then
/// claim in order; a mover whose cell is taken turns into a stayer, and
/// since its own cell is now held the claims are redone from scratch.
/// The held set only grows, so this settles in at most one pass per
/// agent, and the result never puts two agents on one cell.
fn execute(
    grid: &GridSpec,
    positions: &IndexMap<AgentId, Cell>,
    plans: &IndexMap<AgentId, AgentPlan>,
) -> Step {
    let desired: IndexMap<AgentId, Cell> = positions
        .iter()
        .map(|(&id, &here)| {
            let want = plans
                .get(&id)
                .and_then(AgentPlan::next_cell)
                .filter(|&cell| cell == here || (grid.is_open(cell) && cell.is_neighbour(here)))
                .unwrap_or(here);
            (id, want)
        })
        .collect();

    let mut held: HashSet<AgentId> = positions
        .iter()
        .filter(|&(id, &here)| desired[id] == here)
        .map(|(&id, _)| id)
        .collect();
    // Blocked by a barrier that appeared after planning.
    let mut blocked: Vec<AgentId> = positions
        .iter()
        .filter(|&(id, &here)| {
            plans
                .get(id)
                .and_then(AgentPlan::next_cell)
                .is_some_and(|cell| cell != here && desired[id] == here)
        })
        .map(|(&id, _)| id)
        .collect();

    let claims = loop {
        let mut claims: HashMap<Cell, AgentId> = positions
            .iter()
            .filter(|(id, _)| held.contains(*id))
            .map(|(&id, &here)| (here, id))
            .collect();
        let mut loser = None;
        for (&id, &want) in &desired {
            if held.contains(&id) {
                continue;
            }
            if claims.contains_key(&want) {
                loser = Some(id);
                break;
            }
            claims.insert(want, id);
        }
        match loser {
            Some(id) => {
                held.insert(id);
                blocked.push(id);
            }
            None => break claims,
        }
    };

    let mut next = positions.clone();
    for (cell, id) in claims {
        next.insert(id, cell);
    }
    let moved = positions
        .iter()
        .filter(|&(id, &here)| next[id] != here)
        .map(|(&id, _)| id)
        .collect();
    blocked.sort_by_key(|id| positions.get_index_of(id));
    Step {
        positions: next,
        moved,
        blocked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::PathSource;

    fn c(x: i32, y: i32) -> Cell {
        Cell::new(x, y)
    }

    fn plan_through(cells: &[Cell]) -> AgentPlan {
        AgentPlan {
            destination: *cells.last().unwrap(),
            path: cells.to_vec(),
            cursor: 0,
            source: PathSource::Reserved,
        }
    }

    #[test]
    fn first_claim_wins() {
        let grid = GridSpec::new(3).unwrap();
        let positions: IndexMap<AgentId, Cell> =
            [(AgentId(0), c(0, 0)), (AgentId(1), c(2, 0))].into_iter().collect();
        let plans: IndexMap<AgentId, AgentPlan> = [
            (AgentId(0), plan_through(&[c(0, 0), c(1, 0)])),
            (AgentId(1), plan_through(&[c(2, 0), c(1, 0)])),
        ]
        .into_iter()
        .collect();
        let step = execute(&grid, &positions, &plans);
        assert_eq!(step.positions[&AgentId(0)], c(1, 0));
        assert_eq!(step.positions[&AgentId(1)], c(2, 0));
        assert_eq!(step.moved, vec![AgentId(0)]);
        assert_eq!(step.blocked, vec![AgentId(1)]);
    }

    #[test]
    fn blocked_mover_keeps_its_cell_from_followers() {
        // 0 wants 1's cell, 1 is blocked by a stayer; 0 must not land on 1.
        let grid = GridSpec::new(4).unwrap();
        let positions: IndexMap<AgentId, Cell> = [
            (AgentId(0), c(0, 0)),
            (AgentId(1), c(1, 0)),
            (AgentId(2), c(2, 0)),
        ]
        .into_iter()
        .collect();
        let plans: IndexMap<AgentId, AgentPlan> = [
            (AgentId(0), plan_through(&[c(0, 0), c(1, 0)])),
            (AgentId(1), plan_through(&[c(1, 0), c(2, 0)])),
            (AgentId(2), plan_through(&[c(2, 0), c(2, 0)])),
        ]
        .into_iter()
        .collect();
        let step = execute(&grid, &positions, &plans);
        assert_eq!(step.positions, positions);
        assert!(step.moved.is_empty());
        assert_eq!(step.blocked, vec![AgentId(0), AgentId(1)]);
    }

    #[test]
    fn barrier_on_next_cell_holds_agent() {
        let grid = GridSpec::new(3).unwrap().with_barriers([c(1, 0)]).unwrap();
        let positions: IndexMap<AgentId, Cell> = [(AgentId(0), c(0, 0))].into_iter().collect();
        let plans: IndexMap<AgentId, AgentPlan> =
            [(AgentId(0), plan_through(&[c(0, 0), c(1, 0)]))].into_iter().collect();
        let step = execute(&grid, &positions, &plans);
        assert_eq!(step.positions[&AgentId(0)], c(0, 0));
        assert_eq!(step.blocked, vec![AgentId(0)]);
    }

    #[test]
    fn tick_plans_an_idle_group_and_moves() {
        let grid = GridSpec::new(5)
            .unwrap()
            .with_destinations([c(4, 0)])
            .unwrap();
        let state = GroupState::new(&grid, &[Agent::new(0, (0, 0))]).unwrap();
        assert_eq!(state.phase(), Phase::Idle);
        let (next, report) = state.tick(&grid, &PlannerConfig::default());
        assert!(report.replanned);
        assert_eq!(report.moved, vec![AgentId(0)]);
        assert_eq!(next.positions()[&AgentId(0)], c(1, 0));
        assert_eq!(next.phase(), Phase::Executing);
        assert_eq!(next.replans(), 0);
        assert_eq!(next.tick_id(), TickId(1));
        assert_eq!(
            report.transitions,
            vec![(Phase::Idle, Phase::Planning), (Phase::Planning, Phase::Executing)]
        );
        // Input snapshot is untouched.
        assert_eq!(state.positions()[&AgentId(0)], c(0, 0));
    }

    #[test]
    fn complete_state_is_a_fixed_point() {
        let grid = GridSpec::new(3)
            .unwrap()
            .with_destinations([c(1, 0)])
            .unwrap();
        let state = GroupState::new(&grid, &[Agent::new(0, (0, 0))]).unwrap();
        let config = PlannerConfig::default();
        let (done, _) = state.tick(&grid, &config);
        assert_eq!(done.phase(), Phase::Complete);
        let (again, report) = done.tick(&grid, &config);
        assert_eq!(again, done);
        assert!(report.moved.is_empty());
    }

    #[test]
    fn count_mismatch_rejected() {
        let grid = GridSpec::new(3).unwrap();
        assert!(GroupState::new(&grid, &[Agent::new(0, (0, 0))]).is_err());
    }
}
