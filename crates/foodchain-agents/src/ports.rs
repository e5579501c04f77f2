//! Capabilities the agent core consumes but does not implement.
//!
//! The host simulation provides movement, spatial queries, combat and
//! reward delivery through these traits. Agents only ever see other
//! entities through them, which is what keeps one agent from reaching
//! into another's private state.

use foodchain_types::{ActorId, ActorView, CorpseId, PlayerId, Sighting, Vec2};

use crate::corpse::Corpse;

/// A destination-seeking body that the agent steers.
///
/// The agent only requests destinations and reads progress; actually
/// moving the body is the host's job.
pub trait MovementPort {
    /// Current position.
    fn position(&self) -> Vec2;

    /// Request movement toward `point`. Returns `false` when no path could
    /// be planned, in which case the previous path is cleared.
    fn set_destination(&mut self, point: Vec2) -> bool;

    /// Drop the current path without changing the stopped flag.
    fn clear_path(&mut self);

    /// Halt in place. The path is kept.
    fn stop(&mut self);

    /// Continue along the path after [`MovementPort::stop`].
    fn resume(&mut self);

    /// Whether the body has been told to stop.
    fn is_stopped(&self) -> bool;

    /// Whether a destination is set.
    fn has_path(&self) -> bool;

    /// Distance left to the destination, or 0 without a path.
    fn remaining_distance(&self) -> f32;

    /// Commanded speed.
    fn speed(&self) -> f32;

    /// Change the commanded speed.
    fn set_speed(&mut self, speed: f32);

    /// Velocity achieved during the last movement step.
    fn velocity(&self) -> Vec2;

    /// Whether the body stands on walkable ground.
    fn is_on_navigable_surface(&self) -> bool;

    /// The closest walkable point to `point` within `max_distance`.
    fn nearest_navigable(&self, point: Vec2, max_distance: f32) -> Option<Vec2>;
}

/// Source of sightings for perception.
pub trait SpatialQuery {
    /// Every agent, player and corpse within `radius` of `origin`.
    fn query_nearby(&self, origin: Vec2, radius: f32) -> Vec<Sighting>;
}

/// Result of applying damage to an actor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// The target no longer exists.
    NoTarget,
    /// The target survived.
    Wounded {
        /// Health left after the hit.
        remaining: f32,
    },
    /// The target died and was removed; `corpse` is what it left behind.
    Killed {
        /// Corpse created at the target's position, if any.
        corpse: Option<CorpseId>,
    },
}

/// Health mutation of other actors.
pub trait CombatSink {
    /// Apply `amount` damage to `target`.
    fn apply_damage(&mut self, target: ActorId, amount: f32) -> DamageOutcome;

    /// Whether `target` is dead or gone.
    fn is_dead(&self, target: ActorId) -> bool;
}

/// Delivery of corpse rewards to the player.
pub trait RewardSink {
    /// Restore `amount` health to the player.
    fn grant_heal(&mut self, player: PlayerId, amount: u32);

    /// Credit `amount` currency to the player.
    fn grant_currency(&mut self, player: PlayerId, amount: u32);
}

/// Everything an agent may touch outside itself during its tick.
pub trait Surroundings: SpatialQuery + CombatSink {
    /// Live lookup of an actor through a direct handle.
    fn locate(&self, actor: ActorId) -> Option<ActorView>;

    /// A live corpse by handle.
    fn corpse(&self, id: CorpseId) -> Option<&Corpse>;

    /// A live corpse by handle, for claiming and pausing.
    fn corpse_mut(&mut self, id: CorpseId) -> Option<&mut Corpse>;
}
