//! Strongly-typed identifiers.

use std::fmt;

/// Identifies an agent within one run.
///
/// Ids are assigned by whoever builds the roster and are never reused
/// within a run. Ordering follows the numeric value, which is also the
/// order fixtures create agents in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for AgentId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Monotonically increasing tick counter.
///
/// Counts executed ticks of an orchestration loop. Planning time inside a
/// single search is a separate, call-local counter and never a `TickId`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickId(pub u64);

impl TickId {
    /// The tick after this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_next_increments() {
        assert_eq!(TickId(0).next(), TickId(1));
        assert_eq!(TickId::default(), TickId(0));
    }

    #[test]
    fn agent_id_display_and_from() {
        let id: AgentId = 7.into();
        assert_eq!(id.to_string(), "7");
        assert!(AgentId(1) < AgentId(2));
    }
}
