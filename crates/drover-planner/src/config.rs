//! Planner configuration and error types.

use drover_assign::{AssignError, UNREACHABLE_COST};
use drover_core::{GridError, GridSpec};
use thiserror::Error;

// ── PlannerConfig ──────────────────────────────────────────────────

/// Tunables for planning and execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Tick up to which every finished path is padded and its final cell
    /// reserved. Default: 20.
    pub horizon: u32,
    /// Consecutive no-progress ticks that trigger a full replan. Default: 1.
    ///
    /// A threshold of one replans the whole group as soon as a single
    /// tick passes with nobody moving. Raise it to let short waits
    /// resolve on their own.
    pub stall_threshold: u32,
    /// Matrix cost of an agent/destination pair with no route.
    /// Default: 100 000.
    pub unreachable_cost: i64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            horizon: 20,
            stall_threshold: 1,
            unreachable_cost: UNREACHABLE_COST,
        }
    }
}

impl PlannerConfig {
    /// Check grid-independent invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizon == 0 {
            return Err(ConfigError::ZeroHorizon);
        }
        if self.stall_threshold == 0 {
            return Err(ConfigError::ZeroStallThreshold);
        }
        if self.unreachable_cost <= 0 {
            return Err(ConfigError::SentinelTooSmall {
                cost: self.unreachable_cost,
                min: 1,
            });
        }
        Ok(())
    }

    /// [`validate`](Self::validate), and require the sentinel to exceed
    /// the largest total a matching of real paths could cost on `grid`.
    pub fn validate_for(&self, grid: &GridSpec) -> Result<(), ConfigError> {
        self.validate()?;
        let longest = grid.cell_count() as i64;
        let min = longest
            .saturating_mul(grid.destinations().len().max(1) as i64)
            .saturating_add(1);
        if self.unreachable_cost < min {
            return Err(ConfigError::SentinelTooSmall {
                cost: self.unreachable_cost,
                min,
            });
        }
        Ok(())
    }
}

// ── Errors ─────────────────────────────────────────────────────────

/// Rejected [`PlannerConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `horizon` is zero.
    #[error("planning horizon must be at least 1 tick")]
    ZeroHorizon,
    /// `stall_threshold` is zero.
    #[error("stall threshold must be at least 1 tick")]
    ZeroStallThreshold,
    /// `unreachable_cost` could be undercut by a real matching.
    #[error("unreachable cost {cost} is below the safe minimum {min}")]
    SentinelTooSmall {
        /// Configured value.
        cost: i64,
        /// Smallest accepted value.
        min: i64,
    },
}

/// Any failure to set up or replan a group.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PlannerError {
    /// Grid or roster input is malformed.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// The assignment solver rejected its input.
    #[error(transparent)]
    Assign(#[from] AssignError),
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use drover_core::Cell;

    #[test]
    fn defaults_are_valid() {
        let grid = GridSpec::new(10)
            .unwrap()
            .with_destinations((0..20).map(|i| Cell::new(i % 10, i / 10)))
            .unwrap();
        let config = PlannerConfig::default();
        assert_eq!(config.horizon, 20);
        assert_eq!(config.stall_threshold, 1);
        assert!(config.validate_for(&grid).is_ok());
    }

    #[test]
    fn zero_values_rejected() {
        let mut c = PlannerConfig {
            horizon: 0,
            ..PlannerConfig::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::ZeroHorizon));
        c.horizon = 5;
        c.stall_threshold = 0;
        assert_eq!(c.validate(), Err(ConfigError::ZeroStallThreshold));
    }

    #[test]
    fn small_sentinel_rejected_for_large_grid() {
        let grid = GridSpec::new(1000).unwrap();
        let err = PlannerConfig::default().validate_for(&grid).unwrap_err();
        assert!(matches!(err, ConfigError::SentinelTooSmall { min: 1_000_001, .. }));
    }
}
