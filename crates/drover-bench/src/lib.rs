//! Benchmark profiles and a text renderer for the Drover engines.
//!
//! - [`reference_profile`]: the 10x10 grid, 20 agents on the bottom two
//!   rows, and a 20-cell target shape
//! - [`scaled_profile`]: the same layout on a larger grid, with as many
//!   destinations as agents packed around the centre
//! - [`render`]: one character per cell, for the demo and for debugging

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::collections::HashSet;

use drover_core::{shape, Agent, AgentId, Cell, GridError, GridSpec, Shape};

/// The reference scenario targeting `shape`.
pub fn reference_profile(target: Shape) -> Result<(GridSpec, Vec<Agent>), GridError> {
    let grid = GridSpec::new(10)?.with_destinations(target.cells(10))?;
    Ok((grid, shape::bottom_rows(10, 2)))
}

/// `2 * size` agents on the bottom two rows of a `size x size` grid and
/// `2 * size` destinations nearest the centre.
pub fn scaled_profile(size: u32) -> Result<(GridSpec, Vec<Agent>), GridError> {
    let roster = shape::bottom_rows(size, 2);
    let n = size as i32;
    let centre = Cell::new(n / 2, n / 2);
    let mut cells: Vec<Cell> = (0..n - 2)
        .flat_map(|y| (0..n).map(move |x| Cell::new(x, y)))
        .filter(|&c| c != centre)
        .collect();
    cells.sort_by_key(|&c| (c.chebyshev(centre), c.manhattan(centre), c));
    cells.truncate(roster.len());
    let grid = GridSpec::new(size)?.with_destinations(cells)?;
    Ok((grid, roster))
}

/// Draw the grid: `#` barrier, `o` empty destination, `@` agent on a
/// destination, `a` other agent, `.` empty cell. Row `y = 0` comes first.
pub fn render<'a>(
    grid: &GridSpec,
    agents: impl IntoIterator<Item = (&'a AgentId, &'a Cell)>,
) -> String {
    let occupied: HashSet<Cell> = agents.into_iter().map(|(_, &cell)| cell).collect();
    let n = grid.size() as i32;
    let mut out = String::with_capacity(((n + 1) * n) as usize);
    for y in 0..n {
        for x in 0..n {
            let cell = Cell::new(x, y);
            let ch = match (
                grid.is_barrier(cell),
                occupied.contains(&cell),
                grid.is_destination(cell),
            ) {
                (true, _, _) => '#',
                (_, true, true) => '@',
                (_, true, false) => 'a',
                (_, false, true) => 'o',
                _ => '.',
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}
