//! Static Euclidean A* on one obstacle snapshot.

use std::collections::{HashMap, HashSet, VecDeque};

use drover_core::Cell;
use drover_space::{Obstacles, Open, Square8};
use tracing::trace;

use crate::frontier::{Frontier, NodeArena};

/// Corner-safe 8-connected search with Euclidean cost and heuristic.
///
/// `walls` are impassable and gate diagonal moves (no squeezing past a
/// blocked shoulder). Cells in `avoid` are impassable but do not gate
/// diagonals; parked agents are modelled this way.
#[derive(Clone, Copy)]
pub struct SpatialSearch<'a> {
    lattice: Square8,
    walls: &'a dyn Obstacles,
    avoid: &'a dyn Obstacles,
}

impl<'a> SpatialSearch<'a> {
    /// A search over `lattice` blocked by `walls` only.
    pub fn new(lattice: Square8, walls: &'a dyn Obstacles) -> Self {
        Self {
            lattice,
            walls,
            avoid: &Open,
        }
    }

    /// Also refuse to enter any cell in `avoid`.
    pub fn avoiding(mut self, avoid: &'a dyn Obstacles) -> Self {
        self.avoid = avoid;
        self
    }

    fn enterable(&self, cell: Cell) -> bool {
        self.lattice.contains(cell) && !self.walls.is_blocked(cell) && !self.avoid.is_blocked(cell)
    }

    /// Cheapest route from `start` to `goal`, both ends included.
    ///
    /// `start` is never checked; a blocked `goal` is unreachable.
    pub fn plan(&self, start: Cell, goal: Cell) -> Option<Vec<Cell>> {
        if start == goal {
            return Some(vec![start]);
        }
        if !self.enterable(goal) {
            return None;
        }

        let mut arena: NodeArena<Cell> = NodeArena::new();
        let mut frontier = Frontier::new();
        let mut best: HashMap<Cell, f64> = HashMap::new();

        let root = arena.push(start, None, 0.0);
        best.insert(start, 0.0);
        frontier.push(start.euclid(goal), root);

        while let Some(index) = frontier.pop() {
            let node = *arena.get(index);
            let cell = node.state;
            if best.get(&cell).is_some_and(|&g| node.g > g) {
                continue;
            }
            if cell == goal {
                return Some(arena.trace(index));
            }
            for nb in self.lattice.moves(cell, self.walls) {
                if self.avoid.is_blocked(nb) {
                    continue;
                }
                let g = node.g + cell.euclid(nb);
                if best.get(&nb).is_some_and(|&seen| g >= seen) {
                    continue;
                }
                best.insert(nb, g);
                let child = arena.push(nb, Some(index), g);
                frontier.push(g + nb.euclid(goal), child);
            }
        }
        trace!(%start, %goal, nodes = arena.len(), "spatial search exhausted");
        None
    }

    /// True when [`plan`](Self::plan) would find a route.
    pub fn reaches(&self, start: Cell, goal: Cell) -> bool {
        self.plan(start, goal).is_some()
    }

    /// Fewest corner-safe moves from `start` to any cell satisfying
    /// `is_target`, by breadth-first search.
    pub fn hops_to(&self, start: Cell, is_target: impl Fn(Cell) -> bool) -> Option<u32> {
        let mut seen: HashSet<Cell> = HashSet::from([start]);
        let mut queue = VecDeque::from([(start, 0u32)]);
        while let Some((cell, d)) = queue.pop_front() {
            if is_target(cell) {
                return Some(d);
            }
            for nb in self.lattice.moves(cell, self.walls) {
                if self.enterable(nb) && seen.insert(nb) {
                    queue.push_back((nb, d + 1));
                }
            }
        }
        None
    }
}

/// Total Euclidean length of a cell path.
pub fn path_length(path: &[Cell]) -> f64 {
    path.windows(2).map(|w| w[0].euclid(w[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn c(x: i32, y: i32) -> Cell {
        Cell::new(x, y)
    }

    #[test]
    fn open_grid_three_diagonals_and_one_straight() {
        let search = SpatialSearch::new(Square8::new(10), &Open);
        let path = search.plan(c(0, 0), c(3, 4)).unwrap();
        assert_eq!(path.len(), 5);
        let diagonals = path
            .windows(2)
            .filter(|w| w[0].x != w[1].x && w[0].y != w[1].y)
            .count();
        assert_eq!(diagonals, 3);
        assert!((path_length(&path) - (3.0 * 2f64.sqrt() + 1.0)).abs() < 1e-9);
    }

    #[test]
    fn no_corner_cutting_past_walls() {
        // Wall at (1,0): the diagonal (0,0)->(1,1) is forbidden.
        let walls: HashSet<Cell> = [c(1, 0)].into_iter().collect();
        let search = SpatialSearch::new(Square8::new(3), &walls);
        let path = search.plan(c(0, 0), c(1, 1)).unwrap();
        assert_eq!(path, vec![c(0, 0), c(0, 1), c(1, 1)]);
    }

    #[test]
    fn avoided_cells_do_not_gate_diagonals() {
        let parked: HashSet<Cell> = [c(1, 0)].into_iter().collect();
        let search = SpatialSearch::new(Square8::new(3), &Open).avoiding(&parked);
        assert_eq!(search.plan(c(0, 0), c(1, 1)), Some(vec![c(0, 0), c(1, 1)]));
        assert_eq!(search.plan(c(0, 0), c(1, 0)), None);
    }

    #[test]
    fn enclosed_goal_unreachable() {
        let walls: HashSet<Cell> = [c(1, 0), c(1, 1), c(0, 1)].into_iter().collect();
        let search = SpatialSearch::new(Square8::new(3), &walls);
        assert!(!search.reaches(c(2, 2), c(0, 0)));
        assert!(search.reaches(c(2, 2), c(2, 0)));
    }

    #[test]
    fn hops_count_moves_to_nearest_target() {
        let search = SpatialSearch::new(Square8::new(10), &Open);
        assert_eq!(search.hops_to(c(3, 8), |x| x == c(4, 7)), Some(1));
        assert_eq!(search.hops_to(c(0, 9), |x| x.y <= 7 && x.x >= 3), Some(3));
        assert_eq!(search.hops_to(c(0, 0), |_| false), None);
    }
}
