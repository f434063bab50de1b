//! Target-shape and roster generators.
//!
//! These produce the standard 20-cell formations and the two-row starting
//! roster used by the reference scenario. All outputs are clipped to the
//! grid and returned in a deterministic order.

use crate::cell::{Agent, Cell};
use crate::id::AgentId;

/// Offsets of the diamond formation around the grid centre.
///
/// The centre cell itself is not part of the shape.
const DIAMOND_OFFSETS: [(i32, i32); 20] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-2, 0),
    (2, 0),
    (0, -2),
    (0, 2),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
    (-2, -1),
    (-2, 1),
    (2, -1),
    (2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
];

/// Named target formations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// 20-cell ring-like diamond around `(size/2, size/2)`.
    Diamond,
    /// 4x5 block: columns `cx-2..cx+2`, rows `cy-2..cy+3`.
    Rectangle,
}

impl Shape {
    /// Cells of the shape on a `size x size` grid, sorted by `(x, y)`.
    pub fn cells(self, size: u32) -> Vec<Cell> {
        match self {
            Shape::Diamond => diamond(size),
            Shape::Rectangle => rectangle(size),
        }
    }
}

fn centre(size: u32) -> Cell {
    let c = (size / 2) as i32;
    Cell::new(c, c)
}

fn clip_sorted(size: u32, cells: impl Iterator<Item = Cell>) -> Vec<Cell> {
    let n = size as i32;
    let mut out: Vec<Cell> = cells
        .filter(|c| c.x >= 0 && c.x < n && c.y >= 0 && c.y < n)
        .collect();
    out.sort();
    out.dedup();
    out
}

/// The diamond formation.
pub fn diamond(size: u32) -> Vec<Cell> {
    let c = centre(size);
    clip_sorted(
        size,
        DIAMOND_OFFSETS.iter().map(|&(dx, dy)| c.offset(dx, dy)),
    )
}

/// The rectangle formation.
pub fn rectangle(size: u32) -> Vec<Cell> {
    let c = centre(size);
    clip_sorted(
        size,
        (-2..2).flat_map(move |dx| (-2..3).map(move |dy| c.offset(dx, dy))),
    )
}

/// Agents filling the bottom `rows` rows of the grid.
///
/// Ids count up from 0, starting with the topmost of the filled rows and
/// running left to right, so on a 10x10 grid with two rows, ids 0..10 sit
/// on row 8 and ids 10..20 on row 9.
pub fn bottom_rows(size: u32, rows: u32) -> Vec<Agent> {
    let rows = rows.min(size);
    let n = size as i32;
    let mut out = Vec::with_capacity((rows * size) as usize);
    let mut id = 0u32;
    for from_bottom in (0..rows as i32).rev() {
        let y = n - 1 - from_bottom;
        for x in 0..n {
            out.push(Agent {
                id: AgentId(id),
                position: Cell::new(x, y),
            });
            id += 1;
        }
    }
    out
}
