//! Test utilities for Drover development.
//!
//! Provides the reference 10x10 fixtures, seeded random scenarios, and a
//! brute-force assignment oracle for cross-checking the solver.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod oracle;
pub mod scenario;

pub use fixtures::{positions, reference_grid, reference_roster, REFERENCE_SIZE};
pub use oracle::{brute_force_min, permutations};
pub use scenario::{connected_roster, random_scenario, Scenario};
