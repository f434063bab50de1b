//! Grid cells and agents.

use std::fmt;

use crate::id::AgentId;

/// A grid cell `(x, y)`.
///
/// Coordinates are signed so that neighbour offsets can step outside the
/// grid before a bounds check rejects them. Equality is value equality;
/// the derived ordering is `x` first, then `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Cell {
    /// Create a cell.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell displaced by `(dx, dy)`. No bounds check.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// L1 distance.
    pub fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// L-inf distance: the tick count of an unobstructed 8-connected route.
    pub fn chebyshev(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Straight-line distance.
    pub fn euclid(self, other: Cell) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        dx.hypot(dy)
    }

    /// True when `other` shares an edge with `self` (4-adjacency).
    pub fn is_orthogonal_neighbour(self, other: Cell) -> bool {
        self.manhattan(other) == 1
    }

    /// True when `other` is one of the 8 surrounding cells.
    pub fn is_neighbour(self, other: Cell) -> bool {
        self != other && self.chebyshev(other) == 1
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// An agent: a uniquely identified point on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Agent {
    /// Unique id within the run.
    pub id: AgentId,
    /// Current cell.
    pub position: Cell,
}

impl Agent {
    /// Create an agent at `position`.
    pub fn new(id: impl Into<AgentId>, position: impl Into<Cell>) -> Self {
        Self {
            id: id.into(),
            position: position.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn distances_on_known_pair() {
        let a = Cell::new(0, 0);
        let b = Cell::new(3, 4);
        assert_eq!(a.manhattan(b), 7);
        assert_eq!(a.chebyshev(b), 4);
        assert!((a.euclid(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn adjacency() {
        let c = Cell::new(2, 2);
        assert!(c.is_orthogonal_neighbour(Cell::new(2, 3)));
        assert!(!c.is_orthogonal_neighbour(Cell::new(3, 3)));
        assert!(c.is_neighbour(Cell::new(3, 3)));
        assert!(!c.is_neighbour(c));
        assert!(!c.is_neighbour(Cell::new(4, 2)));
    }

    #[test]
    fn ordering_is_x_then_y() {
        let mut cells = vec![Cell::new(1, 0), Cell::new(0, 5), Cell::new(0, 1)];
        cells.sort();
        assert_eq!(cells, vec![Cell::new(0, 1), Cell::new(0, 5), Cell::new(1, 0)]);
    }

    proptest! {
        #[test]
        fn metrics_are_ordered(ax in -20i32..20, ay in -20i32..20, bx in -20i32..20, by in -20i32..20) {
            let a = Cell::new(ax, ay);
            let b = Cell::new(bx, by);
            let cheb = f64::from(a.chebyshev(b));
            let man = f64::from(a.manhattan(b));
            prop_assert!(cheb <= a.euclid(b) + 1e-9);
            prop_assert!(a.euclid(b) <= man + 1e-9);
            prop_assert_eq!(a.manhattan(b), b.manhattan(a));
        }
    }
}
