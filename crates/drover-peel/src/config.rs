//! Run configuration and setup errors.

use drover_core::{Cell, GridError, OccupancyError};
use thiserror::Error;

/// Tunables for a peeling run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeelConfig {
    /// Ticks [`PeelRun::run`](crate::PeelRun::run) executes before giving
    /// up. The engine itself has no termination guarantee. Default: 500.
    pub tick_cap: u64,
}

impl Default for PeelConfig {
    fn default() -> Self {
        Self { tick_cap: 500 }
    }
}

impl PeelConfig {
    /// Check invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_cap == 0 {
            return Err(ConfigError::ZeroTickCap);
        }
        Ok(())
    }
}

/// Rejected [`PeelConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `tick_cap` is zero.
    #[error("tick cap must be at least 1")]
    ZeroTickCap,
}

/// A run that cannot start.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PeelError {
    /// Grid or roster input is malformed.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The roster could not be placed on the grid.
    #[error(transparent)]
    Occupancy(#[from] OccupancyError),
    /// The roster does not form one 4-connected chain.
    #[error("roster is not 4-connected")]
    DisconnectedRoster,
    /// No agent can reach any destination.
    #[error("no agent can reach a destination")]
    NoReachableHead,
    /// The head reaches no destination by a static path.
    #[error("no destination reachable from head at {head}")]
    AnchorUnreachable {
        /// The head's cell.
        head: Cell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cap_is_valid() {
        assert_eq!(PeelConfig::default().tick_cap, 500);
        assert!(PeelConfig::default().validate().is_ok());
        assert_eq!(
            PeelConfig { tick_cap: 0 }.validate(),
            Err(ConfigError::ZeroTickCap)
        );
    }
}
