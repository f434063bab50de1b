//! Time-expanded A*.
//!
//! States are `(cell, tick)`. Each tick an agent may stay put or step to
//! any of its eight neighbours, every action costing one tick. The
//! heuristic is Manhattan distance: it overestimates diagonal progress,
//! which makes the search greedier toward the goal. Transition costs stay
//! uniform, so a returned path is still a valid timed route; it is simply
//! not guaranteed to be the fewest ticks when the search has to detour.
//!
//! No diagonal corner-cut rule applies here; only barriers, reserved
//! `(cell, tick)` slots, and moves that would swap places with a reserved
//! move are impassable.

use std::collections::{HashSet, VecDeque};

use drover_core::Cell;
use drover_space::{Obstacles, Square8, OFFSETS_8};
use tracing::trace;

use crate::frontier::{Frontier, NodeArena};

/// A timed route: `(cell, tick)` pairs with consecutive ticks.
pub type TimedPath = Vec<(Cell, u32)>;

/// Claimed `(cell, tick)` slots built up during one planning pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reservations {
    slots: HashSet<(Cell, u32)>,
    // (from, to, arrival tick) of every reserved step between two cells.
    moves: HashSet<(Cell, Cell, u32)>,
    latest: u32,
}

impl Reservations {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `cell` at tick `t`.
    pub fn reserve(&mut self, cell: Cell, t: u32) {
        self.slots.insert((cell, t));
        self.latest = self.latest.max(t);
    }

    /// Claim every step of `path`, and every move between two cells so
    /// that no later path can cross it head-on.
    pub fn reserve_path(&mut self, path: &[(Cell, u32)]) {
        for &(cell, t) in path {
            self.reserve(cell, t);
        }
        for w in path.windows(2) {
            let ((from, _), (to, t)) = (w[0], w[1]);
            if from != to {
                self.moves.insert((from, to, t));
            }
        }
    }

    /// Claim `cell` for every tick in `from..=until`.
    pub fn park(&mut self, cell: Cell, from: u32, until: u32) {
        for t in from..=until {
            self.reserve(cell, t);
        }
    }

    /// True when `cell` is claimed at tick `t`.
    pub fn is_reserved(&self, cell: Cell, t: u32) -> bool {
        self.slots.contains(&(cell, t))
    }

    /// True when stepping `from -> to` arriving at tick `t` would swap
    /// places with a reserved move `to -> from`.
    pub fn is_crossing(&self, from: Cell, to: Cell, t: u32) -> bool {
        from != to && self.moves.contains(&(to, from, t))
    }

    /// Highest claimed tick, `0` when empty.
    pub fn latest(&self) -> u32 {
        self.latest
    }

    /// Number of claimed slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when nothing is claimed.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Time-expanded search over a lattice and a barrier snapshot.
#[derive(Clone, Copy)]
pub struct TimedSearch<'a> {
    lattice: Square8,
    barriers: &'a dyn Obstacles,
}

impl<'a> TimedSearch<'a> {
    /// A search over `lattice` that never enters a cell in `barriers`.
    pub fn new(lattice: Square8, barriers: &'a dyn Obstacles) -> Self {
        Self { lattice, barriers }
    }

    /// Route from `start` at tick `t0` to `goal`, avoiding `reserved`.
    ///
    /// Returns `None` when the goal cannot be reached at all, or not
    /// before tick `max(t0, reserved.latest()) + cell_count`. The start
    /// slot itself is never checked against barriers or reservations.
    pub fn plan(
        &self,
        start: Cell,
        goal: Cell,
        t0: u32,
        reserved: &Reservations,
    ) -> Option<TimedPath> {
        if start == goal {
            return Some(vec![(start, t0)]);
        }
        if !self.spatially_reachable(start, goal) {
            trace!(%start, %goal, "goal not spatially reachable");
            return None;
        }

        let limit = t0.max(reserved.latest()) + self.lattice.cell_count() as u32;
        let mut arena: NodeArena<(Cell, u32)> = NodeArena::new();
        let mut frontier = Frontier::new();
        let mut seen: HashSet<(Cell, u32)> = HashSet::new();

        let root = arena.push((start, t0), None, 0.0);
        seen.insert((start, t0));
        frontier.push(start.manhattan(goal) as f64, root);

        while let Some(index) = frontier.pop() {
            let node = *arena.get(index);
            let (cell, t) = node.state;
            if cell == goal {
                return Some(arena.trace(index));
            }
            if t >= limit {
                continue;
            }
            let next_t = t + 1;
            let g = node.g + 1.0;
            for (dx, dy) in std::iter::once((0, 0)).chain(OFFSETS_8) {
                let nb = cell.offset(dx, dy);
                if !self.lattice.contains(nb)
                    || self.barriers.is_blocked(nb)
                    || reserved.is_reserved(nb, next_t)
                    || reserved.is_crossing(cell, nb, next_t)
                    || !seen.insert((nb, next_t))
                {
                    continue;
                }
                let child = arena.push((nb, next_t), Some(index), g);
                frontier.push(g + nb.manhattan(goal) as f64, child);
            }
        }
        trace!(%start, %goal, t0, limit, nodes = arena.len(), "timed search exhausted");
        None
    }

    /// 8-connected flood fill ignoring time and reservations.
    fn spatially_reachable(&self, start: Cell, goal: Cell) -> bool {
        if !self.lattice.contains(goal) || self.barriers.is_blocked(goal) {
            return false;
        }
        let mut seen: HashSet<Cell> = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(cell) = queue.pop_front() {
            if cell == goal {
                return true;
            }
            for nb in self.lattice.neighbours(cell) {
                if !self.barriers.is_blocked(nb) && seen.insert(nb) {
                    queue.push_back(nb);
                }
            }
        }
        false
    }
}

/// Number of moves in a timed path.
pub fn ticks(path: &[(Cell, u32)]) -> u32 {
    path.len().saturating_sub(1) as u32
}
