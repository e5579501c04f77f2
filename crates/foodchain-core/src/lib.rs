//! Host simulation for the Foodchain agents.
//!
//! This crate owns the world: it stores agents, corpses and the player in
//! an arena, implements the ports the agent core consumes, and runs the
//! fixed-step tick cycle.
//!
//! # Modules
//!
//! - [`clock`] -- Fixed-step simulation clock
//! - [`config`] -- YAML configuration loading and validation
//! - [`control`] -- Shared stop and pacing state for the run loop
//! - [`nav`] -- Terrain and the straight-line navigation body
//! - [`player`] -- The input-driven player entity
//! - [`runner`] -- The async run loop
//! - [`spawner`] -- Initial population and respawning
//! - [`tick`] -- The per-tick scheduler
//! - [`world`] -- The entity arena and its port implementations

pub mod clock;
pub mod config;
pub mod control;
pub mod nav;
pub mod player;
pub mod runner;
pub mod spawner;
pub mod tick;
pub mod world;

pub use clock::{ClockError, SimClock};
pub use config::{ConfigError, SimulationConfig};
pub use control::{RunControl, SimulationEndReason};
pub use nav::{NavBody, Obstacle, Terrain};
pub use player::{Player, PlayerInput};
pub use runner::{NoOpCallback, RunnerError, SimulationResult, TickCallback, run_simulation};
pub use spawner::SpawnError;
pub use tick::{SimulationState, TickError, TickSummary, run_tick};
pub use world::World;
