//! Kuhn–Munkres with row/column potentials, O(n³).

use thiserror::Error;

/// Rejected solver input.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AssignError {
    /// The solver only matches square matrices.
    #[error("cost matrix is {rows}x{cols}, expected square")]
    NotSquare {
        /// Row count.
        rows: usize,
        /// Column count.
        cols: usize,
    },
    /// A row has a different length from the first row.
    #[error("row {row} has {found} entries, expected {expected}")]
    Ragged {
        /// Offending row index.
        row: usize,
        /// Length of row 0.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
}

/// Dense row-major cost matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CostMatrix {
    rows: usize,
    cols: usize,
    data: Vec<i64>,
}

impl CostMatrix {
    /// A `rows x cols` matrix filled with `value`.
    pub fn filled(rows: usize, cols: usize, value: i64) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Build from nested rows; all rows must have equal length.
    pub fn from_rows(rows: &[Vec<i64>]) -> Result<Self, AssignError> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != cols {
                return Err(AssignError::Ragged {
                    row,
                    expected: cols,
                    found: values.len(),
                });
            }
            data.extend_from_slice(values);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Row count.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Column count.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Entry at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> i64 {
        self.data[row * self.cols + col]
    }

    /// Overwrite entry `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: i64) {
        self.data[row * self.cols + col] = value;
    }

    /// Sum of the entries selected by a row-to-column matching.
    pub fn total(&self, matching: &[usize]) -> i64 {
        matching
            .iter()
            .enumerate()
            .map(|(row, &col)| self.get(row, col))
            .sum()
    }
}

/// Minimum-cost perfect matching. Returns the column chosen for each row.
///
/// Ties between equal-cost matchings resolve deterministically for a
/// given matrix.
pub fn solve(matrix: &CostMatrix) -> Result<Vec<usize>, AssignError> {
    let (n, m) = (matrix.rows(), matrix.cols());
    if n != m {
        return Err(AssignError::NotSquare { rows: n, cols: m });
    }
    if n == 0 {
        return Ok(Vec::new());
    }

    // 1-based potentials; column 0 is the virtual start column.
    let mut u = vec![0i64; n + 1];
    let mut v = vec![0i64; m + 1];
    let mut p = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![i64::MAX; m + 1];
        let mut used = vec![false; m + 1];
        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = i64::MAX;
            let mut j1 = 0usize;
            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let cur = matrix.get(i0 - 1, j - 1) - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }
            for j in 0..=m {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut matching = vec![0usize; n];
    for j in 1..=m {
        matching[p[j] - 1] = j - 1;
    }
    Ok(matching)
}
