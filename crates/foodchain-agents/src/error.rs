//! Error types for the foodchain-agents crate.
//!
//! Every variant here is recoverable at the level of a single agent. The
//! scheduler logs them; only [`AgentError::CorruptState`] causes the agent
//! to be removed, and nothing here is allowed to stop the simulation.

use foodchain_types::{AgentId, EntityRef};

/// Errors that can occur while updating an agent.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AgentError {
    /// A weak reference (target or eating target) no longer resolves.
    #[error("stale reference from {agent} to {entity:?}")]
    StaleReference {
        /// The agent holding the reference.
        agent: AgentId,
        /// The entity that no longer exists.
        entity: EntityRef,
    },

    /// Movement has not progressed for several consecutive checks, or the
    /// agent left the navigable surface.
    #[error("agent {agent} is stuck after {checks} checks")]
    Stuck {
        /// The stuck agent.
        agent: AgentId,
        /// Number of consecutive failed progress checks.
        checks: u32,
    },

    /// A spawn request asked for a level below 1.
    #[error("invalid level {requested}, clamped to {clamped}")]
    InvalidLevel {
        /// The level that was requested.
        requested: i64,
        /// The level actually used.
        clamped: u32,
    },

    /// The agent's own state contains a non-finite value and cannot be
    /// ticked further.
    #[error("agent {agent} has corrupt state: {context}")]
    CorruptState {
        /// The affected agent.
        agent: AgentId,
        /// What was found to be invalid.
        context: String,
    },
}
