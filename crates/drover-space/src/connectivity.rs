//! 4-connectivity over small cell sets.
//!
//! A chain of agents is only meaningful while its cells form one
//! orthogonally connected component. These helpers test that property,
//! find paths inside a set, and order a set head-first for sliding.

use std::collections::{HashSet, VecDeque};

use drover_core::Cell;
use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::lattice::OFFSETS_4;

/// Node expansions allowed to [`snake_order`] before it gives up.
pub const SNAKE_BUDGET: usize = 10_000;

fn orthogonal(cell: Cell) -> impl Iterator<Item = Cell> {
    OFFSETS_4.into_iter().map(move |(dx, dy)| cell.offset(dx, dy))
}

/// True when `cells` is non-empty and forms one 4-connected component.
pub fn is_four_connected(cells: &[Cell]) -> bool {
    let Some(&first) = cells.first() else {
        return false;
    };
    let members: HashSet<Cell> = cells.iter().copied().collect();
    let mut seen = HashSet::with_capacity(members.len());
    seen.insert(first);
    let mut queue = VecDeque::from([first]);
    while let Some(cell) = queue.pop_front() {
        for nb in orthogonal(cell) {
            if members.contains(&nb) && seen.insert(nb) {
                queue.push_back(nb);
            }
        }
    }
    seen.len() == members.len()
}

/// True when every consecutive pair in `order` is orthogonally adjacent.
pub fn is_snake(order: &[Cell]) -> bool {
    order
        .windows(2)
        .all(|w| w[0].is_orthogonal_neighbour(w[1]))
}

/// True when removing `member` leaves the rest of `cells` 4-connected.
///
/// Removing the only member is always allowed.
pub fn is_removable(cells: &[Cell], member: Cell) -> bool {
    let rest: Vec<Cell> = cells.iter().copied().filter(|&c| c != member).collect();
    rest.is_empty() || is_four_connected(&rest)
}

/// Shortest orthogonal path from `from` to `to` that stays inside `cells`.
pub fn path_within(cells: &[Cell], from: Cell, to: Cell) -> Option<Vec<Cell>> {
    let members: HashSet<Cell> = cells.iter().copied().collect();
    if !members.contains(&from) || !members.contains(&to) {
        return None;
    }
    let mut prev: IndexMap<Cell, Option<Cell>> = IndexMap::new();
    prev.insert(from, None);
    let mut queue = VecDeque::from([from]);
    while let Some(cell) = queue.pop_front() {
        if cell == to {
            let mut path = vec![cell];
            let mut cursor = cell;
            while let Some(&Some(p)) = prev.get(&cursor) {
                path.push(p);
                cursor = p;
            }
            path.reverse();
            return Some(path);
        }
        for nb in orthogonal(cell) {
            if members.contains(&nb) && !prev.contains_key(&nb) {
                prev.insert(nb, Some(cell));
                queue.push_back(nb);
            }
        }
    }
    None
}

/// Breadth-first order of `cells` from `head`.
///
/// Members unreachable from `head` follow in their input order, so the
/// result is always a permutation of `cells` starting at `head` (when
/// `head` is a member).
pub fn bfs_order(cells: &[Cell], head: Cell) -> Vec<Cell> {
    let members: HashSet<Cell> = cells.iter().copied().collect();
    let mut seen: HashSet<Cell> = HashSet::with_capacity(members.len());
    let mut order = Vec::with_capacity(cells.len());
    if members.contains(&head) {
        seen.insert(head);
        let mut queue = VecDeque::from([head]);
        while let Some(cell) = queue.pop_front() {
            order.push(cell);
            for nb in orthogonal(cell) {
                if members.contains(&nb) && seen.insert(nb) {
                    queue.push_back(nb);
                }
            }
        }
    }
    for &cell in cells {
        if seen.insert(cell) {
            order.push(cell);
        }
    }
    order
}

/// A Hamiltonian path through `cells` starting at `head`, if one is found
/// within [`SNAKE_BUDGET`] expansions.
///
/// The search is a depth-first walk that tries the neighbour with the
/// fewest onward options first, breaking ties by Manhattan distance to
/// `toward`. Branches are cut as soon as the unvisited remainder is
/// disconnected from the walk's tip or has two dead ends.
pub fn snake_order(cells: &[Cell], head: Cell, toward: Cell) -> Option<Vec<Cell>> {
    let members: HashSet<Cell> = cells.iter().copied().collect();
    if !members.contains(&head) {
        return None;
    }
    let mut search = SnakeSearch {
        visited: HashSet::with_capacity(members.len()),
        order: Vec::with_capacity(members.len()),
        members,
        toward,
        budget: SNAKE_BUDGET,
    };
    search.visit(head).then_some(search.order)
}

/// Head-first ordering for a chain: a snake when one is found, otherwise
/// breadth-first order.
pub fn chain_order(cells: &[Cell], head: Cell, toward: Cell) -> Vec<Cell> {
    snake_order(cells, head, toward).unwrap_or_else(|| bfs_order(cells, head))
}

struct SnakeSearch {
    members: HashSet<Cell>,
    visited: HashSet<Cell>,
    order: Vec<Cell>,
    toward: Cell,
    budget: usize,
}

impl SnakeSearch {
    fn visit(&mut self, cell: Cell) -> bool {
        self.visited.insert(cell);
        self.order.push(cell);
        if self.order.len() == self.members.len() {
            return true;
        }
        if self.budget == 0 || !self.feasible(cell) {
            self.undo(cell);
            return false;
        }
        self.budget -= 1;

        let mut next: SmallVec<[Cell; 4]> = self.open_neighbours(cell).collect();
        next.sort_by_key(|&c| (self.open_neighbours(c).count(), c.manhattan(self.toward)));
        for candidate in next {
            if self.visit(candidate) {
                return true;
            }
            if self.budget == 0 {
                break;
            }
        }
        self.undo(cell);
        false
    }

    fn undo(&mut self, cell: Cell) {
        self.visited.remove(&cell);
        self.order.pop();
    }

    fn open_neighbours(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        orthogonal(cell).filter(|c| self.members.contains(c) && !self.visited.contains(c))
    }

    /// The remainder must hang off `tip` in one piece with at most one
    /// dead end, which would be the last cell of the walk.
    fn feasible(&self, tip: Cell) -> bool {
        let remaining = self.members.len() - self.visited.len();

        let mut seen: HashSet<Cell> = HashSet::with_capacity(remaining);
        let mut queue = VecDeque::from([tip]);
        while let Some(cell) = queue.pop_front() {
            for nb in self.open_neighbours(cell) {
                if seen.insert(nb) {
                    queue.push_back(nb);
                }
            }
        }
        if seen.len() != remaining {
            return false;
        }

        let dead_ends = seen
            .iter()
            .filter(|&&cell| {
                let degree = orthogonal(cell)
                    .filter(|&nb| nb == tip || seen.contains(&nb))
                    .count();
                degree <= 1
            })
            .count();
        remaining == 1 || dead_ends <= 1
    }
}
