//! Agent behavior core for the Foodchain simulation.
//!
//! This crate contains everything that decides what a creature does:
//! resource pools, per-level stats, the corpse consumption protocol, the
//! level-comparison policy and the state machine. It performs no I/O and
//! owns no world; the host simulation plugs in through the traits in
//! [`ports`].
//!
//! # Modules
//!
//! - [`agent`] -- The per-agent state machine ([`Agent`])
//! - [`config`] -- Tunable behavior, pool and corpse parameters
//! - [`corpse`] -- Exclusive, resumable corpse consumption ([`Corpse`])
//! - [`error`] -- Recoverable per-agent faults ([`AgentError`])
//! - [`perception`] -- Nearest-actor and nearest-corpse selection
//! - [`policy`] -- The level-comparison decision rule
//! - [`pool`] -- Bounded hunger, stamina and health pools
//! - [`ports`] -- Movement, spatial query, combat and reward capabilities
//! - [`stats`] -- Per-level combat statistics ([`LevelStats`], [`StatTable`])

pub mod agent;
pub mod config;
pub mod corpse;
pub mod error;
pub mod perception;
pub mod policy;
pub mod pool;
pub mod ports;
pub mod stats;

// Re-export primary types at crate root for convenience.
pub use agent::{Agent, AgentInit, AgentTick, Transition};
pub use config::{BehaviorConfig, CorpseConfig, HungerConfig, StaminaConfig};
pub use corpse::{ClaimError, Corpse, CorpsePhase, CorpseTick, Payout};
pub use error::AgentError;
pub use policy::{Reaction, compare_levels};
pub use pool::{HungerPool, ResourcePool, StaminaPool, hunger_status};
pub use ports::{CombatSink, DamageOutcome, MovementPort, RewardSink, SpatialQuery, Surroundings};
pub use stats::{LevelStats, StatTable, clamp_level};
