//! Drover: moving groups of agents into formation on a grid.
//!
//! This is the facade crate that re-exports the public API of every
//! Drover sub-crate. Two engines are provided:
//!
//! - the **group planner**, which assigns destinations optimally, routes
//!   every agent through a shared reservation table, and replans when
//!   execution stalls;
//! - the **peeling engine**, which walks a connected chain of agents to
//!   an anchor cell and sends each head off on its own from there.
//!
//! # Quick start
//!
//! ```rust
//! use drover::prelude::*;
//!
//! let grid = GridSpec::new(5)
//!     .unwrap()
//!     .with_destinations([Cell::new(4, 4), Cell::new(4, 3)])
//!     .unwrap();
//! let roster = [Agent::new(0, (0, 0)), Agent::new(1, (1, 0))];
//!
//! let mut session = GroupSession::new(grid.clone(), &roster, PlannerConfig::default()).unwrap();
//! assert!(session.run(20).complete);
//!
//! let mut run = PeelRun::new(grid, &roster, PeelConfig::default()).unwrap();
//! let outcome = run.run();
//! assert!(outcome.converged);
//! assert_eq!(outcome.locked, 2);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `drover-core` | Cells, agents, grid spec, occupancy, faults, history |
//! | [`space`] | `drover-space` | 8-connected lattice, obstacle snapshots, chain connectivity |
//! | [`path`] | `drover-path` | Time-expanded and static A* |
//! | [`assign`] | `drover-assign` | Cost matrix and optimal assignment |
//! | [`planner`] | `drover-planner` | Group planner, replanner, and session |
//! | [`peel`] | `drover-peel` | Parallel peeling engine |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core value types (`drover-core`).
pub use drover_core as types;

/// Lattice geometry and connectivity (`drover-space`).
pub use drover_space as space;

/// Single-agent searches (`drover-path`).
///
/// [`path::TimedSearch`] plans against a reservation table;
/// [`path::SpatialSearch`] plans on one static obstacle snapshot.
pub use drover_path as path;

/// Agent-to-destination assignment (`drover-assign`).
pub use drover_assign as assign;

/// Group planning and execution (`drover-planner`).
pub use drover_planner as planner;

/// Chain peeling (`drover-peel`).
pub use drover_peel as peel;

/// Common imports.
///
/// ```rust
/// use drover::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use drover_core::{Agent, AgentId, Cell, Fault, GridError, GridSpec, Shape, TickId};

    // Planner
    pub use drover_planner::{
        GroupSession, GroupState, Phase, PlannerConfig, PlannerError, TickReport,
    };

    // Peeling
    pub use drover_peel::{PeelConfig, PeelError, PeelReport, PeelRun, PeelState};
}
