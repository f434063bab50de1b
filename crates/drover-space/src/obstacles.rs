//! Read-only obstacle snapshots.
//!
//! Searches and cascades ask a single question of the world: is this cell
//! blocked? [`Obstacles`] is that question. Barrier sets, locked-agent
//! cells, and their unions all answer it without being copied.

use std::collections::{BTreeSet, HashSet};

use drover_core::{Cell, GridSpec};
use indexmap::{IndexMap, IndexSet};

/// A snapshot that can report blocked cells.
pub trait Obstacles {
    /// True when no agent may enter `cell`.
    fn is_blocked(&self, cell: Cell) -> bool;
}

impl<T: Obstacles + ?Sized> Obstacles for &T {
    fn is_blocked(&self, cell: Cell) -> bool {
        (**self).is_blocked(cell)
    }
}

impl Obstacles for IndexSet<Cell> {
    fn is_blocked(&self, cell: Cell) -> bool {
        self.contains(&cell)
    }
}

impl Obstacles for HashSet<Cell> {
    fn is_blocked(&self, cell: Cell) -> bool {
        self.contains(&cell)
    }
}

impl Obstacles for BTreeSet<Cell> {
    fn is_blocked(&self, cell: Cell) -> bool {
        self.contains(&cell)
    }
}

/// Map keys are ignored; any cell appearing as a value is blocked.
/// Used for `id -> cell` maps of parked agents.
impl<K> Obstacles for IndexMap<K, Cell> {
    fn is_blocked(&self, cell: Cell) -> bool {
        self.values().any(|&c| c == cell)
    }
}

/// A grid blocks exactly its barriers.
impl Obstacles for GridSpec {
    fn is_blocked(&self, cell: Cell) -> bool {
        self.is_barrier(cell)
    }
}

/// Nothing is blocked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Open;

impl Obstacles for Open {
    fn is_blocked(&self, _cell: Cell) -> bool {
        false
    }
}

/// A cell is blocked when either side blocks it.
#[derive(Clone, Copy, Debug)]
pub struct Union<A, B>(pub A, pub B);

impl<A: Obstacles, B: Obstacles> Obstacles for Union<A, B> {
    fn is_blocked(&self, cell: Cell) -> bool {
        self.0.is_blocked(cell) || self.1.is_blocked(cell)
    }
}
