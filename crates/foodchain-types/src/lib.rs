//! Shared type definitions for the Foodchain simulation.
//!
//! This crate is the single source of truth for identifiers and small
//! value types used across the workspace.
//!
//! # Modules
//!
//! - [`ids`] -- Typed arena handles for agents, corpses and the player
//! - [`enums`] -- Behavior states, hunger bands, entity kinds
//! - [`geometry`] -- Ground-plane vector math
//! - [`perception`] -- Sightings and actor lookups fed to agent perception

pub mod enums;
pub mod geometry;
pub mod ids;
pub mod perception;

// Re-export all public types at crate root for convenience.
pub use enums::{BehaviorState, EntityKind, HungerStatus};
pub use geometry::Vec2;
pub use ids::{ActorId, AgentId, CorpseId, EntityRef, PlayerId};
pub use perception::{ActorView, Sighting};
