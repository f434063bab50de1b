//! Spatial layer for Drover.
//!
//! [`Square8`] is the bounded 8-connected lattice every search runs on,
//! with the corner-cut rule applied against an [`Obstacles`] snapshot.
//! The [`connectivity`] module holds the 4-connectivity helpers used to
//! keep a chain of agents in one piece.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod connectivity;
pub mod lattice;
pub mod obstacles;

pub use connectivity::{
    bfs_order, chain_order, is_four_connected, is_removable, is_snake, path_within, snake_order,
};
pub use lattice::{cuts_corner, shoulders, Square8, OFFSETS_4, OFFSETS_8};
pub use obstacles::{Obstacles, Open, Union};
