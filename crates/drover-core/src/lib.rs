//! Core types for the Drover multi-agent grid coordination engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the value types shared by every other crate in the workspace: grid
//! cells, agent identities, the static grid description, the
//! bidirectional occupancy map, the fault taxonomy reported by ticks,
//! target-shape generators, and the step-back history container.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod error;
pub mod grid;
pub mod id;
pub mod occupancy;
pub mod shape;
pub mod timeline;

pub use cell::{Agent, Cell};
pub use error::{Fault, GridError, Invariant};
pub use grid::GridSpec;
pub use id::{AgentId, TickId};
pub use occupancy::{Occupancy, OccupancyError};
pub use shape::Shape;
pub use timeline::Timeline;
