//! Error types.
//!
//! Two families live here. [`GridError`] is returned from constructors
//! and validation when the inputs to a run are malformed; it is the only
//! error that stops a run from starting. [`Fault`] is the runtime
//! taxonomy: every fault degrades to "no progress this tick" for the
//! agent concerned and is reported, never propagated.

use thiserror::Error;

use crate::cell::Cell;
use crate::id::AgentId;

/// Malformed grid or roster input, detected before a run starts.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// The grid has zero cells.
    #[error("grid size must be at least 1")]
    EmptyGrid,
    /// The grid side exceeds [`GridSpec::MAX_SIZE`](crate::GridSpec::MAX_SIZE).
    #[error("grid size {size} exceeds maximum {max}")]
    SizeTooLarge {
        /// Requested side length.
        size: u32,
        /// Largest accepted side length.
        max: u32,
    },
    /// A barrier, destination, or agent lies outside the grid.
    #[error("cell {cell} is outside the {size}x{size} grid")]
    OutOfBounds {
        /// The offending cell.
        cell: Cell,
        /// Grid side length.
        size: u32,
    },
    /// Two roster entries share an id.
    #[error("agent id {id} appears more than once")]
    DuplicateAgent {
        /// The repeated id.
        id: AgentId,
    },
    /// Two roster entries share a cell.
    #[error("agents {first} and {second} both start at {cell}")]
    AgentsCollide {
        /// Earlier agent in roster order.
        first: AgentId,
        /// Later agent in roster order.
        second: AgentId,
        /// The shared cell.
        cell: Cell,
    },
    /// A roster entry starts on a barrier.
    #[error("agent {id} starts on barrier {cell}")]
    AgentOnBarrier {
        /// The agent.
        id: AgentId,
        /// The barrier cell.
        cell: Cell,
    },
    /// The roster and the destination set differ in size.
    #[error("{agents} agents cannot be matched to {destinations} destinations")]
    CountMismatch {
        /// Number of agents.
        agents: usize,
        /// Number of destinations.
        destinations: usize,
    },
}

/// Which post-tick invariant failed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Invariant {
    /// The unpeeled chain no longer forms one 4-connected component.
    #[error("chain is no longer 4-connected")]
    ChainDisconnected,
    /// Two agents ended the tick on the same cell.
    #[error("agents {first} and {second} share cell {cell}")]
    PositionsCollide {
        /// One agent on the cell.
        first: AgentId,
        /// The other agent on the cell.
        second: AgentId,
        /// The shared cell.
        cell: Cell,
    },
}

/// Non-fatal runtime degradation reported by planning and ticks.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Fault {
    /// A search exhausted its frontier; the caller fell back to holding.
    #[error("no path from {from} to {to}")]
    PathNotFound {
        /// Search start.
        from: Cell,
        /// Search goal.
        to: Cell,
    },
    /// An agent was matched to a destination at sentinel cost.
    #[error("agent {agent} cannot reach assigned destination {destination}")]
    AssignmentUnreachable {
        /// The agent.
        agent: AgentId,
        /// The destination it was forced onto.
        destination: Cell,
    },
    /// A push cascade found no free cell, or would have moved a locked agent.
    #[error("cascade into {cell} blocked for agent {agent}")]
    CascadeBlocked {
        /// The agent that wanted to move.
        agent: AgentId,
        /// The occupied cell it wanted to enter.
        cell: Cell,
    },
    /// A post-tick invariant check failed and the tick was discarded.
    #[error("tick rejected: {0}")]
    InvariantViolation(#[from] Invariant),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_messages_name_cells() {
        let f = Fault::PathNotFound {
            from: Cell::new(0, 0),
            to: Cell::new(3, 4),
        };
        assert_eq!(f.to_string(), "no path from (0, 0) to (3, 4)");
    }

    #[test]
    fn invariant_converts_into_fault() {
        let f: Fault = Invariant::ChainDisconnected.into();
        assert_eq!(f.to_string(), "tick rejected: chain is no longer 4-connected");
    }

    #[test]
    fn grid_error_display() {
        let e = GridError::CountMismatch {
            agents: 3,
            destinations: 4,
        };
        assert_eq!(e.to_string(), "3 agents cannot be matched to 4 destinations");
    }
}
