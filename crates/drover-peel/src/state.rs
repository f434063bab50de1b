//! Peeling run state.

use drover_core::{Agent, AgentId, Cell, GridSpec, Occupancy, TickId};
use drover_space::{chain_order, is_four_connected};
use indexmap::{IndexMap, IndexSet};
use tracing::info;

use crate::config::PeelError;
use crate::select::{find_head, select_anchor};

/// An agent detached from the chain and routed on its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeeledAgent {
    /// Claimed destination.
    pub destination: Cell,
    /// Route to `destination`. Empty when it must be recomputed.
    pub path: Vec<Cell>,
    /// Index into `path` of the agent's current cell.
    pub index: usize,
}

impl PeeledAgent {
    /// True when the agent stands on the last cell of its path.
    pub fn at_end(&self) -> bool {
        !self.path.is_empty() && self.index + 1 >= self.path.len()
    }
}

/// Snapshot of a peeling run.
///
/// Every agent is in exactly one of three groups: the `chain` (unpeeled,
/// head first), `peeled` (routing to a claimed destination), or `locked`
/// (arrived, never moves again). Each destination is either free or
/// claimed by exactly one peeled or locked agent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeelState {
    pub(crate) tick: TickId,
    pub(crate) occupancy: Occupancy,
    pub(crate) chain: Vec<AgentId>,
    pub(crate) peeled: IndexMap<AgentId, PeeledAgent>,
    pub(crate) locked: IndexMap<AgentId, Cell>,
    pub(crate) anchor: Cell,
    pub(crate) free: IndexSet<Cell>,
}

impl PeelState {
    /// Set up a run: pick the head and the anchor, and order the roster
    /// into a chain.
    pub fn start(grid: &GridSpec, roster: &[Agent]) -> Result<Self, PeelError> {
        let positions = grid.validate_matching_roster(roster)?;
        let cells: Vec<Cell> = positions.values().copied().collect();
        if !is_four_connected(&cells) {
            return Err(PeelError::DisconnectedRoster);
        }
        let head = find_head(grid, &positions).ok_or(PeelError::NoReachableHead)?;
        let head_cell = positions[&head];
        let anchor =
            select_anchor(grid, head_cell).ok_or(PeelError::AnchorUnreachable { head: head_cell })?;

        let occupancy = Occupancy::from_positions(positions.iter().map(|(&id, &c)| (id, c)))?;
        let chain = chain_order(&cells, head_cell, anchor)
            .into_iter()
            .filter_map(|cell| occupancy.occupant(cell))
            .collect();
        info!(head = %head, %anchor, agents = cells.len(), "peeling run set up");
        Ok(Self {
            tick: TickId::default(),
            occupancy,
            chain,
            peeled: IndexMap::new(),
            locked: IndexMap::new(),
            anchor,
            free: grid.destinations().clone(),
        })
    }

    /// Ticks executed so far.
    pub fn tick_id(&self) -> TickId {
        self.tick
    }

    /// Agent positions in roster order.
    pub fn positions(&self) -> &IndexMap<AgentId, Cell> {
        self.occupancy.positions()
    }

    /// Position of one agent.
    pub fn position(&self, id: AgentId) -> Option<Cell> {
        self.occupancy.position(id)
    }

    /// Unpeeled agents, head first.
    pub fn chain(&self) -> &[AgentId] {
        &self.chain
    }

    /// Detached agents still travelling.
    pub fn peeled(&self) -> &IndexMap<AgentId, PeeledAgent> {
        &self.peeled
    }

    /// Arrived agents and the destinations they hold.
    pub fn locked(&self) -> &IndexMap<AgentId, Cell> {
        &self.locked
    }

    /// The destination at which chain heads detach.
    pub fn anchor(&self) -> Cell {
        self.anchor
    }

    /// Destinations nobody has claimed.
    pub fn free_destinations(&self) -> &IndexSet<Cell> {
        &self.free
    }

    /// Cells of the chain members, head first.
    pub fn chain_cells(&self) -> Vec<Cell> {
        self.chain
            .iter()
            .filter_map(|&id| self.occupancy.position(id))
            .collect()
    }

    /// Every claimed destination, peeled claims first.
    pub fn claims(&self) -> Vec<Cell> {
        self.peeled
            .values()
            .map(|p| p.destination)
            .chain(self.locked.values().copied())
            .collect()
    }

    /// True when nothing is left to do: no free destinations, no chain,
    /// and every peeled agent at the end of its path.
    pub fn is_converged(&self) -> bool {
        self.free.is_empty() && self.chain.is_empty() && self.peeled.values().all(PeeledAgent::at_end)
    }

    /// Re-derive the chain order from the cells it occupies, starting at
    /// `head`.
    pub(crate) fn reorder_chain(&mut self, head: Cell) {
        let cells = self.chain_cells();
        self.chain = chain_order(&cells, head, self.anchor)
            .into_iter()
            .filter_map(|cell| self.occupancy.occupant(cell))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drover_core::Shape;
    use drover_test_utils::{reference_grid, reference_roster};

    #[test]
    fn reference_setup() {
        let grid = reference_grid(Shape::Diamond);
        let state = PeelState::start(&grid, &reference_roster()).unwrap();
        assert_eq!(state.anchor(), Cell::new(4, 7));
        assert_eq!(state.chain().len(), 20);
        assert_eq!(state.position(state.chain()[0]), Some(Cell::new(3, 8)));
        assert!(is_four_connected(&state.chain_cells()));
        assert_eq!(state.free_destinations().len(), 20);
        assert!(state.claims().is_empty());
        assert!(!state.is_converged());
    }

    #[test]
    fn disconnected_roster_rejected() {
        let grid = GridSpec::new(5)
            .unwrap()
            .with_destinations([Cell::new(4, 4), Cell::new(4, 3)])
            .unwrap();
        let roster = [Agent::new(0, (0, 0)), Agent::new(1, (2, 0))];
        assert_eq!(
            PeelState::start(&grid, &roster),
            Err(PeelError::DisconnectedRoster)
        );
    }

    #[test]
    fn walled_off_roster_has_no_head() {
        let grid = GridSpec::new(5)
            .unwrap()
            .with_barriers([Cell::new(2, 0), Cell::new(2, 1), Cell::new(2, 2), Cell::new(2, 3), Cell::new(2, 4)])
            .unwrap()
            .with_destinations([Cell::new(4, 4), Cell::new(4, 3)])
            .unwrap();
        let roster = [Agent::new(0, (0, 0)), Agent::new(1, (1, 0))];
        assert_eq!(
            PeelState::start(&grid, &roster),
            Err(PeelError::NoReachableHead)
        );
    }
}
