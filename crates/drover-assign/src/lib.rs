//! Optimal assignment of agents to destinations.
//!
//! [`assign`] prices every agent/destination pair with a timed search
//! (ticks on an empty reservation table, or [`UNREACHABLE_COST`]) and
//! solves the resulting square matrix with [`hungarian::solve`]. Pairs
//! that had to be matched at sentinel cost are reported as faults, not
//! errors.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod assign;
pub mod hungarian;

pub use assign::{assign, cost_matrix, Assignment, UNREACHABLE_COST};
pub use hungarian::{solve, AssignError, CostMatrix};
