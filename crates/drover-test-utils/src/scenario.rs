//! Seeded random scenarios.
//!
//! Every generator takes an explicit seed and draws from a ChaCha8 stream,
//! so a failing case is reproduced by its seed alone.

use std::collections::HashSet;

use drover_core::{Agent, AgentId, Cell, GridSpec};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// A grid and a roster that validates against it.
#[derive(Clone, Debug)]
pub struct Scenario {
    pub grid: GridSpec,
    pub roster: Vec<Agent>,
}

fn all_cells(size: u32) -> Vec<Cell> {
    let n = size as i32;
    (0..n)
        .flat_map(|y| (0..n).map(move |x| Cell::new(x, y)))
        .collect()
}

/// `agents` agents, as many destinations, and `barriers` barriers, all on
/// distinct cells of a `size x size` grid.
///
/// # Panics
///
/// Panics if the grid has fewer than `barriers + 2 * agents` cells.
pub fn random_scenario(seed: u64, size: u32, agents: usize, barriers: usize) -> Scenario {
    let mut cells = all_cells(size);
    assert!(
        barriers + 2 * agents <= cells.len(),
        "{size}x{size} grid cannot hold {barriers} barriers and {agents} agent/destination pairs"
    );
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    cells.shuffle(&mut rng);

    let (walls, rest) = cells.split_at(barriers);
    let (starts, rest) = rest.split_at(agents);
    let targets = &rest[..agents];

    let grid = GridSpec::new(size)
        .and_then(|g| g.with_barriers(walls.iter().copied()))
        .and_then(|g| g.with_destinations(targets.iter().copied()))
        .expect("generated cells are in bounds");
    let roster = starts
        .iter()
        .enumerate()
        .map(|(i, &cell)| Agent {
            id: AgentId(i as u32),
            position: cell,
        })
        .collect();
    Scenario { grid, roster }
}

/// A 4-connected roster of `agents` agents grown from a random seed cell,
/// plus as many destinations scattered over the remaining cells.
///
/// # Panics
///
/// Panics if the grid has fewer than `2 * agents` cells.
pub fn connected_roster(seed: u64, size: u32, agents: usize) -> Scenario {
    let total = (size as usize) * (size as usize);
    assert!(2 * agents <= total, "{size}x{size} grid too small");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let n = size as i32;
    let inside = |c: Cell| c.x >= 0 && c.x < n && c.y >= 0 && c.y < n;

    let first = Cell::new(rng.gen_range(0..n), rng.gen_range(0..n));
    let mut blob = vec![first];
    let mut taken: HashSet<Cell> = HashSet::from([first]);
    while blob.len() < agents {
        let frontier: Vec<Cell> = blob
            .iter()
            .flat_map(|&c| [c.offset(1, 0), c.offset(-1, 0), c.offset(0, 1), c.offset(0, -1)])
            .filter(|&c| inside(c) && !taken.contains(&c))
            .collect();
        let Some(&next) = frontier.choose(&mut rng) else {
            break;
        };
        taken.insert(next);
        blob.push(next);
    }

    let mut free: Vec<Cell> = all_cells(size)
        .into_iter()
        .filter(|c| !taken.contains(c))
        .collect();
    free.shuffle(&mut rng);
    free.truncate(blob.len());

    let grid = GridSpec::new(size)
        .and_then(|g| g.with_destinations(free))
        .expect("generated cells are in bounds");
    let roster = blob
        .into_iter()
        .enumerate()
        .map(|(i, cell)| Agent {
            id: AgentId(i as u32),
            position: cell,
        })
        .collect();
    Scenario { grid, roster }
}
