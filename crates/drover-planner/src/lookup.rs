//! Greedy stepping from a precomputed action-value table.
//!
//! The table itself is produced elsewhere; this module only reads it.
//! Rows and columns follow matrix convention: `row` is `y`, `col` is `x`.

use drover_core::Cell;
use tracing::warn;

/// Moves indexed like an action-value vector, as `(d_row, d_col)`.
pub const ACTIONS: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// Source of per-cell action values for one agent.
pub trait ActionValues {
    /// Values for `agent` standing at `(row, col)`, one per entry of
    /// [`ACTIONS`]. `None` if the table has no entry there.
    fn action_values(&self, agent: usize, row: i32, col: i32) -> Option<&[f64]>;
}

/// Dense `[agent][row][col][action]` table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValueTable {
    values: Vec<Vec<Vec<Vec<f64>>>>,
}

impl ValueTable {
    /// Wrap a nested table.
    pub fn new(values: Vec<Vec<Vec<Vec<f64>>>>) -> Self {
        Self { values }
    }

    /// Number of agents covered.
    pub fn agents(&self) -> usize {
        self.values.len()
    }
}

impl ActionValues for ValueTable {
    fn action_values(&self, agent: usize, row: i32, col: i32) -> Option<&[f64]> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        self.values
            .get(agent)?
            .get(row)?
            .get(col)
            .map(Vec::as_slice)
    }
}

/// The cell the highest-valued action leads to, or `None` to stay.
///
/// A missing vector or one whose length differs from [`ACTIONS`] is
/// logged and treated as "stay". Ties go to the earliest action.
pub fn greedy_step<V: ActionValues + ?Sized>(values: &V, agent: usize, from: Cell) -> Option<Cell> {
    let Some(vector) = values.action_values(agent, from.y, from.x) else {
        warn!(agent, cell = %from, "no action values, staying");
        return None;
    };
    if vector.len() != ACTIONS.len() {
        warn!(
            agent,
            cell = %from,
            expected = ACTIONS.len(),
            found = vector.len(),
            "malformed action vector, staying"
        );
        return None;
    }
    let mut best = 0;
    for (i, &v) in vector.iter().enumerate().skip(1) {
        if v > vector[best] {
            best = i;
        }
    }
    let (dr, dc) = ACTIONS[best];
    Some(from.offset(dc, dr))
}
