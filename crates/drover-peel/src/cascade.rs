//! Push cascades: sliding a line of agents one link into a hole.

use std::collections::VecDeque;

use drover_core::{Cell, GridSpec};
use drover_space::{is_four_connected, Square8};
use indexmap::IndexMap;
use tracing::debug;

use crate::state::PeelState;

impl PeelState {
    /// Free `blocked` for an agent standing on `mover`.
    ///
    /// Searches outward from `blocked` through occupied cells (corner-safe
    /// 8-connected moves, never through barriers, locked agents, or
    /// `mover`) for the nearest empty cell, then shifts every occupant on
    /// the found line one link towards it. Displaced peeled agents lose
    /// their route. Returns `false` without changing anything if there is
    /// no such line, if `blocked` holds a locked agent, or if the shift
    /// would split the chain.
    pub(crate) fn push_cascade(&mut self, grid: &GridSpec, blocked: Cell, mover: Cell) -> bool {
        let Some(line) = self.cascade_line(grid, blocked, mover) else {
            return false;
        };

        let mut trial = self.clone();
        let mut chain_moved = false;
        for pair in line.windows(2).rev() {
            let (from, to) = (pair[0], pair[1]);
            let Some(id) = trial.occupancy.occupant(from) else {
                continue;
            };
            if trial.occupancy.relocate(id, to).is_err() {
                return false;
            }
            if let Some(peeled) = trial.peeled.get_mut(&id) {
                peeled.path.clear();
                peeled.index = 0;
            }
            chain_moved |= trial.chain.contains(&id);
        }

        if chain_moved {
            let cells = trial.chain_cells();
            if !is_four_connected(&cells) {
                debug!(%blocked, "cascade would split the chain");
                return false;
            }
            if let Some(&head) = cells.first() {
                trial.reorder_chain(head);
            }
        }
        debug!(%blocked, length = line.len(), "cascade applied");
        *self = trial;
        true
    }

    /// Cells from `blocked` to the nearest reachable empty cell.
    fn cascade_line(&self, grid: &GridSpec, blocked: Cell, mover: Cell) -> Option<Vec<Cell>> {
        let is_locked = |cell: Cell| {
            self.occupancy
                .occupant(cell)
                .is_some_and(|id| self.locked.contains_key(&id))
        };
        if is_locked(blocked) {
            return None;
        }
        let lattice = Square8::of(grid);
        let mut prev: IndexMap<Cell, Option<Cell>> = IndexMap::new();
        prev.insert(blocked, None);
        let mut queue = VecDeque::from([blocked]);
        while let Some(cell) = queue.pop_front() {
            for nb in lattice.moves(cell, grid) {
                if nb == mover || prev.contains_key(&nb) || is_locked(nb) {
                    continue;
                }
                prev.insert(nb, Some(cell));
                if !self.occupancy.is_occupied(nb) {
                    let mut line = vec![nb];
                    let mut cursor = nb;
                    while let Some(&Some(p)) = prev.get(&cursor) {
                        line.push(p);
                        cursor = p;
                    }
                    line.reverse();
                    return Some(line);
                }
                queue.push_back(nb);
            }
        }
        None
    }
}
