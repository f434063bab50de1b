//! Head, anchor, and destination selection.

use std::cmp::Ordering;

use drover_core::{AgentId, Cell, GridSpec};
use drover_path::SpatialSearch;
use drover_space::{Obstacles, Square8};
use indexmap::{IndexMap, IndexSet};

/// The agent with the fewest corner-safe moves to any destination.
///
/// Ties keep the earlier agent. `None` if no agent reaches a destination.
pub fn find_head(grid: &GridSpec, positions: &IndexMap<AgentId, Cell>) -> Option<AgentId> {
    let search = SpatialSearch::new(Square8::of(grid), grid);
    let mut best: Option<(AgentId, u32)> = None;
    for (&id, &cell) in positions {
        let Some(hops) = search.hops_to(cell, |c| grid.is_destination(c)) else {
            continue;
        };
        if best.is_none_or(|(_, d)| hops < d) {
            best = Some((id, hops));
        }
    }
    best.map(|(id, _)| id)
}

/// The destination whose static path from `head` has the fewest cells.
///
/// Ties keep the earlier destination.
pub fn select_anchor(grid: &GridSpec, head: Cell) -> Option<Cell> {
    let search = SpatialSearch::new(Square8::of(grid), grid);
    let mut best: Option<(Cell, usize)> = None;
    for &dest in grid.destinations() {
        let Some(path) = search.plan(head, dest) else {
            continue;
        };
        if best.is_none_or(|(_, len)| path.len() < len) {
            best = Some((dest, path.len()));
        }
    }
    best.map(|(dest, _)| dest)
}

/// The free destination farthest from `anchor` (straight-line) that
/// `from` can reach, with the route to it.
///
/// Routes stay off barriers and off `avoid`. With `skip_anchor` the
/// anchor itself is never chosen. Ties keep the earlier destination.
pub fn farthest_reachable(
    grid: &GridSpec,
    avoid: &dyn Obstacles,
    free: &IndexSet<Cell>,
    anchor: Cell,
    from: Cell,
    skip_anchor: bool,
) -> Option<(Cell, Vec<Cell>)> {
    let mut candidates: Vec<Cell> = free
        .iter()
        .copied()
        .filter(|&d| !(skip_anchor && d == anchor))
        .collect();
    // Stable: equal distances keep set order.
    candidates.sort_by(|a, b| {
        b.euclid(anchor)
            .partial_cmp(&a.euclid(anchor))
            .unwrap_or(Ordering::Equal)
    });
    let search = SpatialSearch::new(Square8::of(grid), grid).avoiding(avoid);
    candidates
        .into_iter()
        .find_map(|dest| search.plan(from, dest).map(|path| (dest, path)))
}
