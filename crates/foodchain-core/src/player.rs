//! The player entity.
//!
//! The player is driven by host input rather than a state machine. Agents
//! see it through perception like any other actor, attack it through the
//! world's combat sink, and it consumes corpses with the same claim
//! protocol agents use, only gated by a held "consume" input. An attack
//! input strikes every agent within a small radius, on a cooldown.

use foodchain_agents::ResourcePool;
use foodchain_types::{ActorId, ActorView, CorpseId, EntityRef, PlayerId, Sighting, Vec2};
use serde::{Deserialize, Serialize};

use crate::config::PlayerConfig;

/// Absorbs `f32` drift when the cooldown is counted down in fixed steps.
const ATTACK_READY_SLACK: f32 = 1e-4;

/// Input for one tick, supplied by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Teleport the player to this point, if walkable.
    pub move_to: Option<Vec2>,
    /// Whether the consume input is held down.
    pub consume_held: bool,
    /// Whether the attack input is pressed.
    #[serde(default)]
    pub attack: bool,
}

/// The player's state.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    id: PlayerId,
    level: u32,
    health: ResourcePool,
    currency: u64,
    position: Vec2,
    consume_held: bool,
    consuming: Option<CorpseId>,
    decay_fraction: f32,
    since_decay: f32,
    consume_range: f32,
    attack_range: f32,
    attack_damage: f32,
    attack_cooldown_secs: f32,
    attack_cooldown: f32,
}

impl Player {
    /// Create a player at full health.
    pub fn new(id: PlayerId, config: &PlayerConfig) -> Self {
        Self {
            id,
            level: config.level.max(1),
            health: ResourcePool::full(config.max_health),
            currency: 0,
            position: Vec2::new(config.start_x, config.start_z),
            consume_held: false,
            consuming: None,
            decay_fraction: config.health_decay_fraction_per_sec.max(0.0),
            since_decay: 0.0,
            consume_range: config.consume_range.max(0.0),
            attack_range: config.attack_range.max(0.0),
            attack_damage: config.attack_damage.max(0.0),
            attack_cooldown_secs: config.attack_cooldown_secs.max(0.0),
            attack_cooldown: 0.0,
        }
    }

    /// Lose health for every whole second elapsed: `ceil(max * fraction)`
    /// per second. Returns the health lost this call.
    pub fn decay(&mut self, dt: f32) -> f32 {
        self.since_decay += dt.max(0.0);
        let per_second = (self.health.max() * self.decay_fraction).ceil();
        let mut lost = 0.0;
        while self.since_decay >= 1.0 {
            self.since_decay -= 1.0;
            lost -= self.health.add(-per_second);
        }
        lost
    }

    /// Let the attack cooldown run down.
    pub fn cool_down(&mut self, dt: f32) {
        self.attack_cooldown = (self.attack_cooldown - dt.max(0.0)).max(0.0);
    }

    /// Start an attack if the cooldown has expired. Returns whether the
    /// attack goes ahead.
    pub fn try_attack(&mut self) -> bool {
        if self.attack_cooldown > ATTACK_READY_SLACK {
            return false;
        }
        self.attack_cooldown = self.attack_cooldown_secs;
        true
    }

    /// Apply damage. Returns the remaining health.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        self.health.add(-amount.max(0.0));
        self.health.value()
    }

    /// Restore health, capped at the maximum.
    pub fn heal(&mut self, amount: u32) {
        self.health.add(amount as f32);
    }

    /// Credit evolution points.
    pub fn add_currency(&mut self, amount: u32) {
        self.currency = self.currency.saturating_add(u64::from(amount));
    }

    /// Record this tick's input.
    pub const fn set_consume_held(&mut self, held: bool) {
        self.consume_held = held;
    }

    /// Move directly to `position`.
    pub const fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Remember which corpse the player holds a claim on.
    pub const fn set_consuming(&mut self, corpse: Option<CorpseId>) {
        self.consuming = corpse;
    }

    /// Whether health has reached zero.
    pub fn is_dead(&self) -> bool {
        self.health.is_empty()
    }

    /// Handle.
    pub const fn id(&self) -> PlayerId {
        self.id
    }

    /// Level, as agents perceive it.
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Health pool.
    pub const fn health(&self) -> &ResourcePool {
        &self.health
    }

    /// Evolution points earned from corpses.
    pub const fn currency(&self) -> u64 {
        self.currency
    }

    /// Current position.
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Whether the consume input is held.
    pub const fn consume_held(&self) -> bool {
        self.consume_held
    }

    /// The corpse currently claimed by the player.
    pub const fn consuming(&self) -> Option<CorpseId> {
        self.consuming
    }

    /// How close a corpse must be to consume it.
    pub const fn consume_range(&self) -> f32 {
        self.consume_range
    }

    /// Radius around the player hit by an attack.
    pub const fn attack_range(&self) -> f32 {
        self.attack_range
    }

    /// Damage dealt to each agent an attack hits.
    pub const fn attack_damage(&self) -> f32 {
        self.attack_damage
    }

    /// Seconds until the next attack is allowed.
    pub const fn attack_cooldown(&self) -> f32 {
        self.attack_cooldown
    }

    /// How agents see the player through a direct handle.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn view(&self) -> ActorView {
        ActorView {
            id: ActorId::Player(self.id),
            level: self.level,
            position: self.position,
            health: self.health.value().ceil() as u32,
        }
    }

    /// How perception reports the player.
    pub const fn sighting(&self) -> Sighting {
        Sighting {
            entity: EntityRef::Actor(ActorId::Player(self.id)),
            level: self.level,
            position: self.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(PlayerId::new(1), &PlayerConfig::default())
    }

    #[test]
    fn health_decays_two_percent_per_whole_second() {
        let mut p = player();
        for _ in 0..9 {
            p.decay(0.1);
        }
        assert!((p.health().value() - 100.0).abs() < f32::EPSILON);
        p.decay(0.1);
        p.decay(0.1);
        assert!((p.health().value() - 98.0).abs() < f32::EPSILON);
    }

    #[test]
    fn decay_rounds_up_to_whole_points() {
        let config = PlayerConfig {
            max_health: 30.0,
            ..PlayerConfig::default()
        };
        let mut p = Player::new(PlayerId::new(1), &config);
        let lost = p.decay(1.0);
        assert!((lost - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn heal_is_capped_and_currency_accumulates() {
        let mut p = player();
        p.take_damage(30.0);
        p.heal(50);
        assert!((p.health().value() - 100.0).abs() < f32::EPSILON);
        p.add_currency(5);
        p.add_currency(7);
        assert_eq!(p.currency(), 12);
    }

    #[test]
    fn attack_waits_for_its_cooldown() {
        let mut p = player();
        assert!(p.try_attack());
        assert!(!p.try_attack());
        for _ in 0..4 {
            p.cool_down(0.1);
            assert!(!p.try_attack());
        }
        p.cool_down(0.1);
        assert!(p.try_attack());
        assert!((p.attack_cooldown() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn view_reports_rounded_up_health() {
        let mut p = player();
        p.take_damage(0.5);
        assert_eq!(p.view().health, 100);
        p.take_damage(200.0);
        assert!(p.is_dead());
        assert!(p.view().is_dead());
    }
}
