//! Group planning and execution.
//!
//! [`plan_group`] assigns every agent a destination and routes the group
//! through a shared reservation table. [`GroupState`] executes those plans
//! one tick at a time, detects stalls, and replans from wherever the
//! agents ended up. [`GroupSession`] adds history, continuous running,
//! and grid edits on top.
//!
//! [`greedy_step`] is the contract with an external action-value table;
//! it does no planning of its own.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod lookup;
pub mod plan;
pub mod session;
pub mod state;

pub use config::{ConfigError, PlannerConfig, PlannerError};
pub use lookup::{greedy_step, ActionValues, ValueTable, ACTIONS};
pub use plan::{plan_group, AgentPlan, GroupPlan, PathSource};
pub use session::{GroupSession, RunOutcome};
pub use state::{GroupState, Phase, TickReport};
