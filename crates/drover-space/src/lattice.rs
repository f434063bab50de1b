//! Bounded square lattice with 8-connected moves.

use drover_core::{Cell, GridSpec};
use smallvec::SmallVec;

use crate::obstacles::Obstacles;

/// Move offsets in expansion order: E, W, S, N, then SE, NW, NE, SW.
///
/// Search frontiers insert successors in this order, so it fixes every
/// tie-break that depends on insertion order.
pub const OFFSETS_8: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
];

/// The four orthogonal offsets, same leading order as [`OFFSETS_8`].
pub const OFFSETS_4: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// A `size x size` lattice with absorbing edges.
///
/// Edge cells simply have fewer neighbours (corners 3, edges 5).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Square8 {
    size: u32,
}

impl Square8 {
    /// A lattice of the given side length.
    ///
    /// Size limits are enforced by [`GridSpec`]; prefer [`Square8::of`].
    pub const fn new(size: u32) -> Self {
        Self { size }
    }

    /// The lattice underlying `grid`.
    pub fn of(grid: &GridSpec) -> Self {
        Self::new(grid.size())
    }

    /// Side length.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of cells.
    pub fn cell_count(&self) -> usize {
        (self.size as usize) * (self.size as usize)
    }

    /// True when `cell` lies on the lattice.
    pub fn contains(&self, cell: Cell) -> bool {
        let n = self.size as i32;
        cell.x >= 0 && cell.x < n && cell.y >= 0 && cell.y < n
    }

    /// Row-major dense index of `cell`, if it lies on the lattice.
    pub fn rank(&self, cell: Cell) -> Option<usize> {
        self.contains(cell)
            .then(|| cell.y as usize * self.size as usize + cell.x as usize)
    }

    /// In-bounds 8-neighbours of `cell`, in [`OFFSETS_8`] order.
    pub fn neighbours(&self, cell: Cell) -> SmallVec<[Cell; 8]> {
        OFFSETS_8
            .iter()
            .map(|&(dx, dy)| cell.offset(dx, dy))
            .filter(|&c| self.contains(c))
            .collect()
    }

    /// In-bounds 4-neighbours of `cell`, in [`OFFSETS_4`] order.
    pub fn orthogonal_neighbours(&self, cell: Cell) -> SmallVec<[Cell; 4]> {
        OFFSETS_4
            .iter()
            .map(|&(dx, dy)| cell.offset(dx, dy))
            .filter(|&c| self.contains(c))
            .collect()
    }

    /// Cells reachable from `from` in one move under `walls`.
    ///
    /// A target must be in bounds and not blocked, and a diagonal move is
    /// rejected when either shoulder cell is blocked.
    pub fn moves<W: Obstacles + ?Sized>(&self, from: Cell, walls: &W) -> SmallVec<[Cell; 8]> {
        OFFSETS_8
            .iter()
            .filter(|&&(dx, dy)| !cuts_corner(from, dx, dy, walls))
            .map(|&(dx, dy)| from.offset(dx, dy))
            .filter(|&c| self.contains(c) && !walls.is_blocked(c))
            .collect()
    }
}

/// True when a diagonal step `(dx, dy)` from `from` squeezes past a
/// blocked shoulder. Orthogonal steps never cut a corner.
pub fn cuts_corner<W: Obstacles + ?Sized>(from: Cell, dx: i32, dy: i32, walls: &W) -> bool {
    dx != 0
        && dy != 0
        && (walls.is_blocked(from.offset(dx, 0)) || walls.is_blocked(from.offset(0, dy)))
}

/// The two orthogonal shoulders of a diagonal step, or `None` for an
/// orthogonal or zero step.
pub fn shoulders(from: Cell, to: Cell) -> Option<[Cell; 2]> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    (dx != 0 && dy != 0).then(|| [from.offset(dx, 0), from.offset(0, dy)])
}
