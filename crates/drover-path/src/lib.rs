//! Single-source search for Drover.
//!
//! Two A* variants share one arena-and-heap core:
//!
//! - [`TimedSearch`]: `(cell, tick)` states, nine unit-cost actions
//!   including "stay", and a [`Reservations`] table of claimed slots.
//!   Used for group planning and assignment costs.
//! - [`SpatialSearch`]: one static snapshot, Euclidean cost, no corner
//!   cutting past walls. Used for anchor selection, booking, and routing
//!   peeled agents.
//!
//! Both expand the lowest `f = g + h` first and break `f` ties by
//! insertion order, so results are reproducible. A search that runs out
//! of frontier returns `None`; it never invents a path.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod frontier;
pub mod spatial;
pub mod timed;

pub use frontier::{Frontier, Node, NodeArena};
pub use spatial::{path_length, SpatialSearch};
pub use timed::{ticks, Reservations, TimedPath, TimedSearch};
