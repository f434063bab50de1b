//! Parallel peeling.
//!
//! A 4-connected chain of agents crawls head first towards an anchor
//! destination. Each head that reaches the anchor detaches, claims the
//! free destination farthest from the anchor that it can reach, and
//! routes there on its own; agents in its way are pushed aside by a
//! cascade. Arrived agents are locked and never move again. The anchor
//! itself is claimed last, by the final chain member.
//!
//! [`PeelState::tick`] is atomic: a tick that would split the chain or
//! stack two agents is discarded. [`PeelRun`] drives ticks up to a cap
//! and keeps a history.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod cascade;
pub mod config;
pub mod run;
pub mod select;
pub mod state;
pub mod tick;

pub use config::{ConfigError, PeelConfig, PeelError};
pub use run::{PeelOutcome, PeelRun};
pub use select::{farthest_reachable, find_head, select_anchor};
pub use state::{PeelState, PeeledAgent};
pub use tick::PeelReport;
