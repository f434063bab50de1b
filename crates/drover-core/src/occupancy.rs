//! Bidirectional agent/cell map.
//!
//! [`Occupancy`] answers both "where is agent `a`" and "who stands on
//! cell `c`" in O(1). Every mutation keeps the two directions in step,
//! so positions are pairwise distinct by construction.

use std::collections::HashMap;

use indexmap::IndexMap;
use thiserror::Error;

use crate::cell::Cell;
use crate::id::AgentId;

/// Rejected occupancy mutation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum OccupancyError {
    /// The agent is not present.
    #[error("agent {0} is not on the grid")]
    UnknownAgent(AgentId),
    /// The agent is already present.
    #[error("agent {0} is already on the grid")]
    AlreadyPlaced(AgentId),
    /// The target cell is held by another agent.
    #[error("cell {cell} is held by agent {holder}")]
    Occupied {
        /// The contested cell.
        cell: Cell,
        /// Its current occupant.
        holder: AgentId,
    },
}

/// Position map keyed both ways.
///
/// Agent iteration order is insertion order and never changes when an
/// agent moves, which keeps per-tick processing deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Occupancy {
    by_agent: IndexMap<AgentId, Cell>,
    by_cell: HashMap<Cell, AgentId>,
}

impl Occupancy {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(id, cell)` pairs, rejecting repeats on either side.
    pub fn from_positions(
        positions: impl IntoIterator<Item = (AgentId, Cell)>,
    ) -> Result<Self, OccupancyError> {
        let mut occupancy = Self::new();
        for (id, cell) in positions {
            occupancy.place(id, cell)?;
        }
        Ok(occupancy)
    }

    /// Put a new agent on `cell`.
    pub fn place(&mut self, id: AgentId, cell: Cell) -> Result<(), OccupancyError> {
        if self.by_agent.contains_key(&id) {
            return Err(OccupancyError::AlreadyPlaced(id));
        }
        if let Some(&holder) = self.by_cell.get(&cell) {
            return Err(OccupancyError::Occupied { cell, holder });
        }
        self.by_agent.insert(id, cell);
        self.by_cell.insert(cell, id);
        Ok(())
    }

    /// Move an existing agent to an empty cell. Moving onto its own cell is a no-op.
    pub fn relocate(&mut self, id: AgentId, to: Cell) -> Result<(), OccupancyError> {
        let from = *self
            .by_agent
            .get(&id)
            .ok_or(OccupancyError::UnknownAgent(id))?;
        if from == to {
            return Ok(());
        }
        if let Some(&holder) = self.by_cell.get(&to) {
            return Err(OccupancyError::Occupied { cell: to, holder });
        }
        self.by_cell.remove(&from);
        self.by_cell.insert(to, id);
        self.by_agent.insert(id, to);
        Ok(())
    }

    /// Cell of `id`, if present.
    pub fn position(&self, id: AgentId) -> Option<Cell> {
        self.by_agent.get(&id).copied()
    }

    /// Agent standing on `cell`, if any.
    pub fn occupant(&self, cell: Cell) -> Option<AgentId> {
        self.by_cell.get(&cell).copied()
    }

    /// True when some agent stands on `cell`.
    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.by_cell.contains_key(&cell)
    }

    /// Number of agents.
    pub fn len(&self) -> usize {
        self.by_agent.len()
    }

    /// True when no agent is placed.
    pub fn is_empty(&self) -> bool {
        self.by_agent.is_empty()
    }

    /// `(id, cell)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (AgentId, Cell)> + '_ {
        self.by_agent.iter().map(|(&id, &cell)| (id, cell))
    }

    /// Read-only id-to-cell projection.
    pub fn positions(&self) -> &IndexMap<AgentId, Cell> {
        &self.by_agent
    }

    /// True when both directions describe the same placement.
    pub fn is_consistent(&self) -> bool {
        self.by_agent.len() == self.by_cell.len()
            && self
                .by_agent
                .iter()
                .all(|(id, cell)| self.by_cell.get(cell) == Some(id))
    }
}
