//! Static grid description: size, barriers, and the target shape.

use indexmap::{IndexMap, IndexSet};

use crate::cell::{Agent, Cell};
use crate::error::GridError;
use crate::id::AgentId;

/// A bounded square grid with blocked cells and target cells.
///
/// `barriers` and `destinations` are insertion-ordered sets: iteration
/// order is part of the deterministic contract (assignment rows, anchor
/// tie-breaks, booking scans all follow it). Disjointness of the two
/// sets is the editing layer's responsibility and is not checked here.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridSpec {
    size: u32,
    barriers: IndexSet<Cell>,
    destinations: IndexSet<Cell>,
}

impl GridSpec {
    /// Largest accepted side length; coordinates are `i32`.
    pub const MAX_SIZE: u32 = 1 << 15;

    /// An empty `size x size` grid.
    pub fn new(size: u32) -> Result<Self, GridError> {
        if size == 0 {
            return Err(GridError::EmptyGrid);
        }
        if size > Self::MAX_SIZE {
            return Err(GridError::SizeTooLarge {
                size,
                max: Self::MAX_SIZE,
            });
        }
        Ok(Self {
            size,
            barriers: IndexSet::new(),
            destinations: IndexSet::new(),
        })
    }

    /// Replace the barrier set. Every cell must be inside the grid.
    pub fn with_barriers(
        mut self,
        barriers: impl IntoIterator<Item = Cell>,
    ) -> Result<Self, GridError> {
        self.barriers = self.collect_in_bounds(barriers)?;
        Ok(self)
    }

    /// Replace the destination set. Every cell must be inside the grid.
    pub fn with_destinations(
        mut self,
        destinations: impl IntoIterator<Item = Cell>,
    ) -> Result<Self, GridError> {
        self.destinations = self.collect_in_bounds(destinations)?;
        Ok(self)
    }

    fn collect_in_bounds(
        &self,
        cells: impl IntoIterator<Item = Cell>,
    ) -> Result<IndexSet<Cell>, GridError> {
        cells
            .into_iter()
            .map(|cell| {
                if self.contains(cell) {
                    Ok(cell)
                } else {
                    Err(GridError::OutOfBounds {
                        cell,
                        size: self.size,
                    })
                }
            })
            .collect()
    }

    /// Side length.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of cells.
    pub fn cell_count(&self) -> usize {
        (self.size as usize) * (self.size as usize)
    }

    /// Blocked cells.
    pub fn barriers(&self) -> &IndexSet<Cell> {
        &self.barriers
    }

    /// Target cells, in their configured order.
    pub fn destinations(&self) -> &IndexSet<Cell> {
        &self.destinations
    }

    /// True when `cell` lies inside the grid.
    pub fn contains(&self, cell: Cell) -> bool {
        let n = self.size as i32;
        cell.x >= 0 && cell.x < n && cell.y >= 0 && cell.y < n
    }

    /// True when `cell` is a barrier.
    pub fn is_barrier(&self, cell: Cell) -> bool {
        self.barriers.contains(&cell)
    }

    /// True when `cell` is part of the target shape.
    pub fn is_destination(&self, cell: Cell) -> bool {
        self.destinations.contains(&cell)
    }

    /// True when `cell` is inside the grid and not a barrier.
    pub fn is_open(&self, cell: Cell) -> bool {
        self.contains(cell) && !self.is_barrier(cell)
    }

    /// Check a roster against this grid.
    ///
    /// Ids must be unique, positions distinct, inside the grid, and off
    /// barriers. Returns the positions keyed by id in roster order.
    pub fn validate_roster(&self, agents: &[Agent]) -> Result<IndexMap<AgentId, Cell>, GridError> {
        let mut positions: IndexMap<AgentId, Cell> = IndexMap::with_capacity(agents.len());
        let mut by_cell: IndexMap<Cell, AgentId> = IndexMap::with_capacity(agents.len());
        for agent in agents {
            if !self.contains(agent.position) {
                return Err(GridError::OutOfBounds {
                    cell: agent.position,
                    size: self.size,
                });
            }
            if self.is_barrier(agent.position) {
                return Err(GridError::AgentOnBarrier {
                    id: agent.id,
                    cell: agent.position,
                });
            }
            if positions.insert(agent.id, agent.position).is_some() {
                return Err(GridError::DuplicateAgent { id: agent.id });
            }
            if let Some(&first) = by_cell.get(&agent.position) {
                return Err(GridError::AgentsCollide {
                    first,
                    second: agent.id,
                    cell: agent.position,
                });
            }
            by_cell.insert(agent.position, agent.id);
        }
        Ok(positions)
    }

    /// Like [`validate_roster`](Self::validate_roster), and additionally
    /// require exactly one destination per agent.
    pub fn validate_matching_roster(
        &self,
        agents: &[Agent],
    ) -> Result<IndexMap<AgentId, Cell>, GridError> {
        if agents.len() != self.destinations.len() {
            return Err(GridError::CountMismatch {
                agents: agents.len(),
                destinations: self.destinations.len(),
            });
        }
        self.validate_roster(agents)
    }
}
