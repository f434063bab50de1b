//! One atomic peeling tick.
//!
//! A tick works on a copy of the state: peeled agents advance first (in
//! the order they were detached), then the chain slides one link towards
//! the anchor and its head detaches if it stands there. The copy replaces
//! the input only if positions are still distinct and the chain still
//! connected afterwards.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use drover_core::{AgentId, Cell, Fault, GridSpec, Invariant, TickId};
use drover_path::SpatialSearch;
use drover_space::{is_four_connected, is_removable, path_within, shoulders, Square8};
use tracing::{debug, info, warn};

use crate::select::farthest_reachable;
use crate::state::{PeelState, PeeledAgent};

/// What happened during one [`PeelState::tick`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PeelReport {
    /// Tick id of the returned state.
    pub tick: TickId,
    /// Chain heads detached this tick.
    pub detached: Vec<AgentId>,
    /// Agents that arrived and were locked.
    pub newly_locked: Vec<AgentId>,
    /// Peeled agents moved to a different destination.
    pub rebooked: Vec<AgentId>,
    /// True if the chain slid.
    pub chain_moved: bool,
    /// True if the tick was discarded and the input state returned.
    pub rejected: bool,
    /// Degradations; none of them stop the run.
    pub faults: Vec<Fault>,
}

impl PeelState {
    /// Advance the run by one tick.
    ///
    /// Returns the input unchanged once converged, and also when the
    /// tick would break an invariant (reported as
    /// [`Fault::InvariantViolation`]).
    pub fn tick(&self, grid: &GridSpec) -> (Self, PeelReport) {
        let mut report = PeelReport {
            tick: self.tick,
            ..PeelReport::default()
        };
        if self.is_converged() {
            return (self.clone(), report);
        }

        let mut next = self.clone();
        next.advance_peeled(grid, &mut report);
        next.advance_chain(grid, &mut report);
        next.lock_arrivals(&mut report);

        if let Err(violation) = next.check_invariants() {
            warn!(tick = %self.tick, %violation, "tick rejected");
            return (
                self.clone(),
                PeelReport {
                    tick: self.tick,
                    rejected: true,
                    faults: vec![Fault::InvariantViolation(violation)],
                    ..PeelReport::default()
                },
            );
        }

        next.tick = next.tick.next();
        report.tick = next.tick;
        if next.is_converged() {
            info!(tick = %next.tick, locked = next.locked.len(), "peeling converged");
        }
        (next, report)
    }

    /// Positions distinct and the chain in one piece.
    pub fn check_invariants(&self) -> Result<(), Invariant> {
        if !self.chain.is_empty() && !is_four_connected(&self.chain_cells()) {
            return Err(Invariant::ChainDisconnected);
        }
        let mut seen: HashMap<Cell, AgentId> = HashMap::with_capacity(self.occupancy.len());
        for (id, cell) in self.occupancy.iter() {
            if let Some(first) = seen.insert(cell, id) {
                return Err(Invariant::PositionsCollide {
                    first,
                    second: id,
                    cell,
                });
            }
        }
        Ok(())
    }

    // ── Peeled agents ──────────────────────────────────────────────

    fn advance_peeled(&mut self, grid: &GridSpec, report: &mut PeelReport) {
        let ids: Vec<AgentId> = self.peeled.keys().copied().collect();
        for id in ids {
            self.advance_one(grid, id, report);
        }
    }

    fn advance_one(&mut self, grid: &GridSpec, id: AgentId, report: &mut PeelReport) {
        let (Some(here), Some(agent)) = (self.occupancy.position(id), self.peeled.get(&id)) else {
            return;
        };
        if here == agent.destination {
            self.lock(id, here, report);
            return;
        }
        if !self.route_is_valid(grid, id, here)
            && !self.reroute(grid, id, here)
            && !self.rebook(grid, id, here, report)
        {
            return;
        }

        let Some(step) = self.next_step(id) else {
            return;
        };
        if self.occupancy.is_occupied(step)
            && !self.push_cascade(grid, step, here)
            && !self.detour(grid, id, here)
        {
            if self.step_off_anchor(grid, id, here) {
                return;
            }
            debug!(agent = %id, cell = %step, "cascade blocked, waiting");
            report.faults.push(Fault::CascadeBlocked {
                agent: id,
                cell: step,
            });
            return;
        }

        let Some(step) = self.next_step(id) else {
            return;
        };
        if self.occupancy.relocate(id, step).is_err() {
            return;
        }
        let arrived = match self.peeled.get_mut(&id) {
            Some(agent) => {
                agent.index += 1;
                step == agent.destination
            }
            None => false,
        };
        if arrived {
            self.lock(id, step, report);
        }
    }

    fn next_step(&self, id: AgentId) -> Option<Cell> {
        let agent = self.peeled.get(&id)?;
        agent.path.get(agent.index + 1).copied()
    }

    /// The stored route starts here, ends at the destination, and crosses
    /// no barrier or locked agent.
    fn route_is_valid(&self, grid: &GridSpec, id: AgentId, here: Cell) -> bool {
        let Some(agent) = self.peeled.get(&id) else {
            return false;
        };
        let locked: HashSet<Cell> = self.locked.values().copied().collect();
        agent.path.get(agent.index) == Some(&here)
            && agent.path.last() == Some(&agent.destination)
            && agent.path[agent.index + 1..]
                .iter()
                .all(|&cell| grid.is_open(cell) && !locked.contains(&cell))
    }

    fn reroute(&mut self, grid: &GridSpec, id: AgentId, here: Cell) -> bool {
        let Some(destination) = self.peeled.get(&id).map(|a| a.destination) else {
            return false;
        };
        let path = SpatialSearch::new(Square8::of(grid), grid)
            .avoiding(&self.locked)
            .plan(here, destination);
        self.replace_route(id, path)
    }

    /// Route around every other agent, used when pushing fails.
    fn detour(&mut self, grid: &GridSpec, id: AgentId, here: Cell) -> bool {
        let Some(destination) = self.peeled.get(&id).map(|a| a.destination) else {
            return false;
        };
        let others: HashSet<Cell> = self
            .occupancy
            .iter()
            .filter(|&(other, _)| other != id)
            .map(|(_, cell)| cell)
            .collect();
        let path = SpatialSearch::new(Square8::of(grid), grid)
            .avoiding(&others)
            .plan(here, destination);
        let found = self.replace_route(id, path);
        if found {
            debug!(agent = %id, "detouring around agents");
        }
        found
    }

    /// Move a stuck agent off the anchor so the chain can reach it.
    ///
    /// Takes the free neighbour nearest the agent's destination and drops
    /// the route, which is recomputed next tick.
    fn step_off_anchor(&mut self, grid: &GridSpec, id: AgentId, here: Cell) -> bool {
        if here != self.anchor || self.chain.is_empty() {
            return false;
        }
        let Some(destination) = self.peeled.get(&id).map(|a| a.destination) else {
            return false;
        };
        let aside = Square8::of(grid)
            .moves(here, grid)
            .into_iter()
            .filter(|&cell| !self.occupancy.is_occupied(cell))
            .min_by(|a, b| {
                a.euclid(destination)
                    .partial_cmp(&b.euclid(destination))
                    .unwrap_or(Ordering::Equal)
            });
        let Some(aside) = aside else {
            return false;
        };
        if self.occupancy.relocate(id, aside).is_err() {
            return false;
        }
        if let Some(agent) = self.peeled.get_mut(&id) {
            agent.path.clear();
            agent.index = 0;
        }
        debug!(agent = %id, %aside, "stepped off the anchor");
        true
    }

    fn replace_route(&mut self, id: AgentId, path: Option<Vec<Cell>>) -> bool {
        match (path, self.peeled.get_mut(&id)) {
            (Some(path), Some(agent)) => {
                agent.path = path;
                agent.index = 0;
                true
            }
            _ => false,
        }
    }

    /// Swap the agent's claim for the farthest reachable free destination.
    fn rebook(&mut self, grid: &GridSpec, id: AgentId, here: Cell, report: &mut PeelReport) -> bool {
        let Some(old) = self.peeled.get(&id).map(|a| a.destination) else {
            return false;
        };
        let skip_anchor = !self.chain.is_empty();
        let Some((destination, path)) =
            farthest_reachable(grid, &self.locked, &self.free, self.anchor, here, skip_anchor)
        else {
            debug!(agent = %id, %here, %old, "no reachable destination, waiting");
            report.faults.push(Fault::PathNotFound { from: here, to: old });
            return false;
        };
        self.free.insert(old);
        self.free.shift_remove(&destination);
        if let Some(agent) = self.peeled.get_mut(&id) {
            agent.destination = destination;
            agent.path = path;
            agent.index = 0;
        }
        debug!(agent = %id, %old, %destination, "rebooked");
        report.rebooked.push(id);
        if destination == here {
            self.lock(id, here, report);
            return false;
        }
        true
    }

    fn lock(&mut self, id: AgentId, cell: Cell, report: &mut PeelReport) {
        self.peeled.shift_remove(&id);
        self.locked.insert(id, cell);
        report.newly_locked.push(id);
        debug!(agent = %id, %cell, "locked");
    }

    fn lock_arrivals(&mut self, report: &mut PeelReport) {
        let arrived: Vec<(AgentId, Cell)> = self
            .peeled
            .iter()
            .filter_map(|(&id, agent)| {
                (self.occupancy.position(id) == Some(agent.destination))
                    .then_some((id, agent.destination))
            })
            .collect();
        for (id, cell) in arrived {
            self.lock(id, cell, report);
        }
    }

    // ── Chain ──────────────────────────────────────────────────────

    fn advance_chain(&mut self, grid: &GridSpec, report: &mut PeelReport) {
        // A member pushed onto the anchor takes over as head.
        if let Some(on_anchor) = self.occupancy.occupant(self.anchor) {
            if self.chain.first() != Some(&on_anchor) && self.chain.contains(&on_anchor) {
                self.reorder_chain(self.anchor);
            }
        }
        let Some(head) = self.chain.first().and_then(|&id| self.occupancy.position(id)) else {
            return;
        };
        if head != self.anchor {
            match self.chain_step(grid, head) {
                Some(step) => {
                    if self.make_room(grid, step, head) {
                        report.chain_moved = self.slide_chain(grid, step);
                    } else {
                        debug!(%step, "chain waits");
                    }
                }
                None => debug!(%head, "chain has no route to the anchor"),
            }
        }
        self.detach_head(grid, report);
    }

    /// Free `step` for the chain head. A peeled agent standing there is
    /// pushed aside with a cascade; chain members and locked agents are not.
    fn make_room(&mut self, grid: &GridSpec, step: Cell, head: Cell) -> bool {
        if !grid.is_open(step) {
            return false;
        }
        match self.occupancy.occupant(step) {
            None => true,
            Some(id) if self.peeled.contains_key(&id) => self.push_cascade(grid, step, head),
            Some(_) => false,
        }
    }

    /// First step of the head's route to the anchor, preferring routes
    /// that do not pass through the chain itself.
    fn chain_step(&self, grid: &GridSpec, head: Cell) -> Option<Cell> {
        let lattice = Square8::of(grid);
        let mut around: HashSet<Cell> = self.locked.values().copied().collect();
        around.extend(self.chain_cells().into_iter().filter(|&c| c != head));
        SpatialSearch::new(lattice, grid)
            .avoiding(&around)
            .plan(head, self.anchor)
            .or_else(|| {
                SpatialSearch::new(lattice, grid)
                    .avoiding(&self.locked)
                    .plan(head, self.anchor)
            })
            .and_then(|path| path.get(1).copied())
    }

    /// Move the head onto `step` and pull the body after it.
    ///
    /// Some member `t` gives up its cell: the members on the in-chain path
    /// from the old head cell to `t` each shift one link forward. `t` is
    /// the first member from the tail whose removal keeps the chain
    /// connected with `step` attached. A diagonal step that no tail can
    /// follow is replaced by one of its free shoulders.
    fn slide_chain(&mut self, grid: &GridSpec, step: Cell) -> bool {
        let cells = self.chain_cells();
        let (Some(&head_id), Some(&head)) = (self.chain.first(), cells.first()) else {
            return false;
        };
        if cells.len() == 1 {
            if self.occupancy.relocate(head_id, step).is_err() {
                return false;
            }
            return true;
        }

        let target = tail_for(&cells, step).map(|t| (step, t)).or_else(|| {
            shoulders(head, step)?.into_iter().find_map(|s| {
                if !grid.is_open(s) || self.occupancy.is_occupied(s) {
                    return None;
                }
                tail_for(&cells, s).map(|t| (s, t))
            })
        });
        let Some((to, tail)) = target else {
            debug!(%head, %step, "no member can follow the head");
            return false;
        };
        let Some(line) = path_within(&cells, head, tail) else {
            return false;
        };

        let mut occupancy = self.occupancy.clone();
        if occupancy.relocate(head_id, to).is_err() {
            return false;
        }
        for pair in line.windows(2) {
            let Some(member) = occupancy.occupant(pair[1]) else {
                return false;
            };
            if occupancy.relocate(member, pair[0]).is_err() {
                return false;
            }
        }
        self.occupancy = occupancy;
        self.reorder_chain(to);
        true
    }

    fn detach_head(&mut self, grid: &GridSpec, report: &mut PeelReport) {
        let Some(&head) = self.chain.first() else {
            return;
        };
        if self.occupancy.position(head) != Some(self.anchor) {
            return;
        }
        let rest: Vec<Cell> = self.chain_cells().into_iter().skip(1).collect();
        if !rest.is_empty() && !is_four_connected(&rest) {
            warn!(agent = %head, "detaching the head would split the chain");
            return;
        }
        let last = self.chain.len() == 1;
        let Some((destination, path)) =
            farthest_reachable(grid, &self.locked, &self.free, self.anchor, self.anchor, !last)
        else {
            warn!(agent = %head, "no free destination reachable from the anchor");
            return;
        };

        self.free.shift_remove(&destination);
        self.chain.remove(0);
        report.detached.push(head);
        debug!(agent = %head, %destination, remaining = self.chain.len(), "detached");
        if destination == self.anchor {
            self.locked.insert(head, destination);
            report.newly_locked.push(head);
        } else {
            self.peeled.insert(
                head,
                PeeledAgent {
                    destination,
                    path,
                    index: 0,
                },
            );
        }
        if let Some(next) = self.chain.first().and_then(|&id| self.occupancy.position(id)) {
            self.reorder_chain(next);
        }
    }
}

/// The member nearest the tail that can drop out while `step` joins.
fn tail_for(cells: &[Cell], step: Cell) -> Option<Cell> {
    cells[1..].iter().rev().copied().find(|&t| {
        is_removable(cells, t)
            && cells
                .iter()
                .any(|&c| c != t && c.is_orthogonal_neighbour(step))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use drover_core::{Agent, Occupancy, Shape};
    use drover_test_utils::{reference_grid, reference_roster};
    use indexmap::IndexMap;

    fn c(x: i32, y: i32) -> Cell {
        Cell::new(x, y)
    }

    #[test]
    fn first_tick_detaches_reference_head() {
        let grid = reference_grid(Shape::Diamond);
        let state = PeelState::start(&grid, &reference_roster()).unwrap();
        let head = state.chain()[0];
        let (next, report) = state.tick(&grid);
        assert!(!report.rejected);
        assert!(report.chain_moved);
        assert_eq!(report.detached, vec![head]);
        assert_eq!(next.position(head), Some(c(4, 7)));
        assert_eq!(next.chain().len(), 19);
        assert!(next.peeled().contains_key(&head));
        assert!(!next.free_destinations().contains(&next.peeled()[&head].destination));
        assert!(next.free_destinations().contains(&c(4, 7)));
        assert_eq!(next.tick_id(), TickId(1));
        // The next head stands beside the anchor.
        let new_head = next.position(next.chain()[0]).unwrap();
        assert!(new_head.is_orthogonal_neighbour(c(4, 7)));
    }

    #[test]
    fn single_agent_run_locks_on_anchor() {
        let grid = GridSpec::new(4)
            .unwrap()
            .with_destinations([c(3, 3)])
            .unwrap();
        let mut state = PeelState::start(&grid, &[Agent::new(0, (0, 0))]).unwrap();
        assert_eq!(state.anchor(), c(3, 3));
        for _ in 0..3 {
            state = state.tick(&grid).0;
        }
        assert_eq!(state.locked().get(&AgentId(0)), Some(&c(3, 3)));
        assert!(state.is_converged());
        let (again, report) = state.tick(&grid);
        assert_eq!(again, state);
        assert_eq!(report, PeelReport { tick: state.tick_id(), ..PeelReport::default() });
    }

    #[test]
    fn tail_must_keep_chain_connected() {
        // An L: (0,0)-(1,0)-(1,1); head (0,0) steps to (0,1).
        let cells = [c(0, 0), c(1, 0), c(1, 1)];
        assert_eq!(tail_for(&cells, c(0, 1)), Some(c(1, 1)));
        // A straight line cannot lose its middle.
        let line = [c(0, 0), c(1, 0), c(2, 0)];
        assert_eq!(tail_for(&line, c(0, 1)), Some(c(2, 0)));
        assert_eq!(tail_for(&line, c(5, 5)), None);
    }

    #[test]
    fn diagonal_step_falls_back_to_shoulder() {
        // Vertical pair, head (1,1) wants (2,2); no tail keeps (2,2) attached.
        let grid = GridSpec::new(4)
            .unwrap()
            .with_destinations([c(3, 3), c(3, 2)])
            .unwrap();
        let mut state =
            PeelState::start(&grid, &[Agent::new(0, (1, 1)), Agent::new(1, (1, 0))]).unwrap();
        state.chain = vec![AgentId(0), AgentId(1)];
        assert!(state.slide_chain(&grid, c(2, 2)));
        let head = state.position(state.chain()[0]).unwrap();
        assert!(head == c(2, 1) || head == c(1, 2));
        assert!(is_four_connected(&state.chain_cells()));
    }

    /// A 7x7 run with the anchor in the (6, 0) corner: `peeled` agents
    /// (id, cell, destination) and the chain head first.
    fn corner_state(grid: &GridSpec, peeled: &[(u32, Cell, Cell)], chain: &[(u32, Cell)]) -> PeelState {
        let occupancy = Occupancy::from_positions(
            peeled
                .iter()
                .map(|&(id, cell, _)| (AgentId(id), cell))
                .chain(chain.iter().map(|&(id, cell)| (AgentId(id), cell))),
        )
        .unwrap();
        let search = SpatialSearch::new(Square8::of(grid), grid);
        let claimed: HashSet<Cell> = peeled.iter().map(|&(_, _, dest)| dest).collect();
        PeelState {
            tick: TickId(0),
            occupancy,
            chain: chain.iter().map(|&(id, _)| AgentId(id)).collect(),
            peeled: peeled
                .iter()
                .map(|&(id, cell, destination)| {
                    let path = search.plan(cell, destination).unwrap();
                    (AgentId(id), PeeledAgent { destination, path, index: 0 })
                })
                .collect(),
            locked: IndexMap::new(),
            anchor: c(6, 0),
            free: grid
                .destinations()
                .iter()
                .copied()
                .filter(|d| !claimed.contains(d))
                .collect(),
        }
    }

    #[test]
    fn agent_walled_in_on_the_anchor_steps_aside() {
        let grid = GridSpec::new(7)
            .unwrap()
            .with_destinations([c(0, 6), c(0, 0), c(0, 1), c(0, 2), c(6, 0)])
            .unwrap();
        // Every push from (6, 0) splits the chain and there is no detour.
        let state = corner_state(
            &grid,
            &[(0, c(6, 0), c(0, 6))],
            &[(1, c(5, 0)), (2, c(5, 1)), (3, c(5, 2)), (4, c(6, 2))],
        );
        assert!(state.check_invariants().is_ok());

        let (next, report) = state.tick(&grid);
        assert!(!report.rejected);
        assert!(report.faults.is_empty());
        assert_eq!(next.position(AgentId(0)), Some(c(6, 1)));
        assert!(next.peeled()[&AgentId(0)].path.is_empty());
        // The chain takes the anchor in the same tick and its head detaches.
        assert!(report.chain_moved);
        assert_eq!(report.detached, vec![AgentId(1)]);
        assert_eq!(next.position(AgentId(1)), Some(c(6, 0)));
        assert_eq!(next.chain().len(), 3);

        let mut state = next;
        for _ in 0..200 {
            if state.is_converged() {
                break;
            }
            let (next, report) = state.tick(&grid);
            assert!(!report.rejected);
            state = next;
        }
        assert!(state.is_converged());
        assert_eq!(state.locked().len(), 5);
    }

    #[test]
    fn chain_pushes_peeled_agent_off_its_step() {
        let grid = GridSpec::new(7)
            .unwrap()
            .with_destinations([c(0, 6), c(0, 0), c(6, 0)])
            .unwrap();
        let mut state = corner_state(&grid, &[(0, c(5, 0), c(0, 6))], &[(1, c(4, 0)), (2, c(3, 0))]);
        let mut report = PeelReport::default();
        state.advance_chain(&grid, &mut report);

        assert!(report.chain_moved);
        assert_eq!(state.position(AgentId(1)), Some(c(5, 0)));
        assert_eq!(state.position(AgentId(2)), Some(c(4, 0)));
        let pushed = state.position(AgentId(0)).unwrap();
        assert!(pushed.is_neighbour(c(5, 0)));
        assert!(state.peeled()[&AgentId(0)].path.is_empty());
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn invariant_check_flags_split_chain() {
        let grid = GridSpec::new(4)
            .unwrap()
            .with_destinations([c(3, 3), c(3, 2)])
            .unwrap();
        let mut state =
            PeelState::start(&grid, &[Agent::new(0, (0, 0)), Agent::new(1, (1, 0))]).unwrap();
        assert!(state.check_invariants().is_ok());
        state.occupancy.relocate(AgentId(1), c(3, 0)).unwrap();
        assert_eq!(state.check_invariants(), Err(Invariant::ChainDisconnected));
    }
}
