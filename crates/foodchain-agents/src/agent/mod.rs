//! The per-agent behavior state machine.
//!
//! An [`Agent`] owns its resource pools, its movement body and all the
//! "in progress" bookkeeping of its current state (time in state, attack
//! cooldown, stuck counter). The scheduler calls [`Agent::tick`] once per
//! fixed step; everything outside the agent is reached through the
//! [`Surroundings`] port.
//!
//! # Tick order
//!
//! 1. Validate that the agent's own state is usable
//! 2. Drop weak references whose referent is gone
//! 3. Age the hunger and stamina pools
//! 4. Pick walk or run speed
//! 5. Run stuck detection; a stuck agent re-paths and skips step 6
//! 6. Run the handler for the current state
//!
//! # Submodules
//!
//! - [`handlers`] -- One handler per [`BehaviorState`].
//! - [`stuck`] -- Consecutive no-progress detection.

pub mod handlers;
pub mod stuck;

use foodchain_types::{
    ActorId, ActorView, AgentId, BehaviorState, CorpseId, EntityRef, HungerStatus, Sighting, Vec2,
};
use rand::{Rng, SeedableRng};
use rand::rngs::SmallRng;

use crate::config::{BehaviorConfig, HungerConfig, StaminaConfig};
use crate::corpse::Payout;
use crate::error::AgentError;
use crate::pool::{HungerPool, ResourcePool, StaminaPool};
use crate::ports::{MovementPort, Surroundings};
use crate::stats::LevelStats;

use self::stuck::StuckTracker;

/// Identity and starting values for a new agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentInit {
    /// Arena handle.
    pub id: AgentId,
    /// Level, already clamped to at least 1.
    pub level: u32,
    /// Stats resolved for `level`.
    pub stats: LevelStats,
    /// Starting hunger.
    pub initial_hunger: f32,
    /// Seed for the agent's private random stream.
    pub seed: u64,
}

/// One state change, for logging and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State left.
    pub from: BehaviorState,
    /// State entered.
    pub to: BehaviorState,
}

/// What happened during one agent tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentTick {
    /// State changes in the order they happened.
    pub transitions: Vec<Transition>,
    /// Actors this agent killed.
    pub kills: Vec<ActorId>,
    /// Whether the agent was declared stuck and re-pathed.
    pub unstuck: bool,
}

/// An autonomous creature.
#[derive(Debug, Clone)]
pub struct Agent<M> {
    id: AgentId,
    level: u32,
    stats: LevelStats,
    body: M,
    health: ResourcePool,
    hunger: HungerPool,
    stamina: StaminaPool,
    state: BehaviorState,
    target: Option<ActorId>,
    eating_target: Option<CorpseId>,
    spawn_anchor: Vec2,
    time_in_state: f32,
    attack_cooldown: f32,
    stuck: StuckTracker,
    rng: SmallRng,
}

impl<M: MovementPort> Agent<M> {
    /// Create an agent in the Wandering state at the body's position.
    pub fn new(init: AgentInit, mut body: M, hunger: &HungerConfig, stamina: &StaminaConfig) -> Self {
        body.set_speed(init.stats.walk_speed);
        let anchor = body.position();
        Self {
            id: init.id,
            level: init.level.max(1),
            stats: init.stats,
            health: ResourcePool::full(init.stats.max_health),
            hunger: HungerPool::new(init.initial_hunger, hunger),
            stamina: StaminaPool::new(stamina),
            state: BehaviorState::Wandering,
            target: None,
            eating_target: None,
            spawn_anchor: anchor,
            time_in_state: 0.0,
            attack_cooldown: 0.0,
            stuck: StuckTracker::new(anchor),
            rng: SmallRng::seed_from_u64(init.seed),
            body,
        }
    }

    /// Advance the agent by `dt` seconds.
    ///
    /// Only [`AgentError::CorruptState`] is returned; every other fault is
    /// recovered inside the tick.
    pub fn tick(
        &mut self,
        dt: f32,
        config: &BehaviorConfig,
        world: &mut impl Surroundings,
    ) -> Result<AgentTick, AgentError> {
        self.check_integrity(dt)?;
        let mut report = AgentTick::default();

        self.refresh_references(world, &mut report);

        let sprinting = self.is_sprinting();
        self.hunger.tick(dt);
        self.stamina.tick(dt, sprinting);
        self.update_speed();

        self.time_in_state += dt;
        self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);

        // A stuck agent spends this tick on its fresh destination.
        if self.check_stuck(dt, config, world, &mut report) {
            return Ok(report);
        }
        self.run_handler(dt, config, world, &mut report);
        Ok(report)
    }

    fn check_integrity(&self, dt: f32) -> Result<(), AgentError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(AgentError::CorruptState {
                agent: self.id,
                context: format!("time step {dt}"),
            });
        }
        let position = self.body.position();
        if !position.is_finite() {
            return Err(AgentError::CorruptState {
                agent: self.id,
                context: format!("position {position}"),
            });
        }
        Ok(())
    }

    /// Clear `target` and `eating_target` if their referents are gone, and
    /// fall back to a state that does not need them.
    fn refresh_references(&mut self, world: &mut impl Surroundings, report: &mut AgentTick) {
        if let Some(target) = self.target
            && (world.locate(target).is_none() || world.is_dead(target))
        {
            let err = AgentError::StaleReference {
                agent: self.id,
                entity: EntityRef::Actor(target),
            };
            tracing::debug!(agent = %self.id, error = %err, "Dropping stale target");
            self.target = None;
            match self.state {
                BehaviorState::Alert => self.transition(BehaviorState::Idle, world, report),
                BehaviorState::Attacking | BehaviorState::Fleeing => {
                    self.transition(BehaviorState::Wandering, world, report);
                }
                BehaviorState::Hunting if self.eating_target.is_none() => {
                    self.transition(BehaviorState::Wandering, world, report);
                }
                _ => {}
            }
        }

        if let Some(corpse) = self.eating_target
            && world.corpse(corpse).is_none()
        {
            let err = AgentError::StaleReference {
                agent: self.id,
                entity: EntityRef::Corpse(corpse),
            };
            tracing::debug!(agent = %self.id, error = %err, "Dropping stale eating target");
            self.eating_target = None;
            if matches!(self.state, BehaviorState::Hunting | BehaviorState::Eating) {
                self.transition(BehaviorState::Wandering, world, report);
            }
        }
    }

    /// Sprinting means the run speed is commanded and the body actually
    /// moved faster than walking pace during the last step.
    fn is_sprinting(&self) -> bool {
        self.state.allows_sprint()
            && self.body.speed() > self.stats.walk_speed
            && self.body.velocity().length() > self.stats.walk_speed
    }

    fn update_speed(&mut self) {
        let speed = if self.state.allows_sprint() && self.stamina.can_sprint() {
            self.stats.run_speed
        } else {
            self.stats.walk_speed
        };
        self.body.set_speed(speed);
    }

    fn check_stuck(
        &mut self,
        dt: f32,
        config: &BehaviorConfig,
        world: &mut impl Surroundings,
        report: &mut AgentTick,
    ) -> bool {
        let Some(checks) = self.stuck.observe(dt, &self.body, config) else {
            return false;
        };
        let err = AgentError::Stuck {
            agent: self.id,
            checks,
        };
        tracing::debug!(agent = %self.id, state = %self.state, error = %err, "Re-pathing stuck agent");

        let position = self.body.position();
        self.body.clear_path();
        if matches!(self.state, BehaviorState::Hunting | BehaviorState::Fleeing) {
            self.transition(BehaviorState::Wandering, world, report);
        }
        let point = self.random_point_near(position, config.unstuck_radius);
        self.body.set_destination(point);
        report.unstuck = true;
        true
    }

    /// Move to `to`, cancelling the work of the current state.
    ///
    /// A transition to the current state is ignored so its timer keeps
    /// running. Leaving Eating pauses the corpse claim and keeps whatever it
    /// paid out.
    pub(crate) fn transition(
        &mut self,
        to: BehaviorState,
        world: &mut impl Surroundings,
        report: &mut AgentTick,
    ) {
        if to == self.state {
            return;
        }
        if self.state == BehaviorState::Eating
            && let Some(corpse_id) = self.eating_target
            && let Some(corpse) = world.corpse_mut(corpse_id)
            && let Some(payout) = corpse.pause_consuming(ActorId::Agent(self.id))
        {
            self.receive_payout(&payout);
        }
        let from = self.state;
        self.enter(to);
        report.transitions.push(Transition { from, to });
    }

    /// State bookkeeping shared by every transition.
    fn enter(&mut self, to: BehaviorState) {
        let from = self.state;
        self.state = to;
        self.time_in_state = 0.0;

        if !matches!(to, BehaviorState::Hunting | BehaviorState::Eating) {
            self.eating_target = None;
        }
        match to {
            BehaviorState::Idle | BehaviorState::Wandering | BehaviorState::Resting => {
                self.target = None;
                self.body.clear_path();
                self.body.resume();
            }
            BehaviorState::Alert | BehaviorState::Attacking => self.body.stop(),
            BehaviorState::Eating => {
                self.target = None;
                self.body.stop();
            }
            BehaviorState::Hunting | BehaviorState::Fleeing => {
                self.body.clear_path();
                self.body.resume();
            }
        }
        self.update_speed();
        tracing::debug!(agent = %self.id, level = self.level, from = %from, to = %to, "State transition");
    }

    /// Credit a corpse payout: heal goes to health, currency is ignored.
    pub fn receive_payout(&mut self, payout: &Payout) {
        self.health.add(payout.heal as f32);
    }

    /// Called when a corpse this agent was eating has been finished.
    ///
    /// Returns the Eating to Wandering transition when the agent was still
    /// eating.
    pub fn finish_meal(&mut self, config: &BehaviorConfig) -> Option<Transition> {
        self.hunger.add(config.corpse_completion_bonus);
        self.eating_target = None;
        tracing::info!(agent = %self.id, hunger = self.hunger.value(), "Finished eating corpse");
        if self.state != BehaviorState::Eating {
            return None;
        }
        self.enter(BehaviorState::Wandering);
        Some(Transition {
            from: BehaviorState::Eating,
            to: BehaviorState::Wandering,
        })
    }

    /// Apply damage to this agent. Returns the remaining health.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        self.health.add(-amount.max(0.0));
        self.health.value()
    }

    /// Whether health has reached zero.
    pub fn is_dead(&self) -> bool {
        self.health.is_empty()
    }

    /// A random navigable point within `radius` of `center`.
    pub(crate) fn random_point_near(&mut self, center: Vec2, radius: f32) -> Vec2 {
        if !radius.is_finite() {
            return center;
        }
        let angle = self.rng.random_range(0.0..core::f32::consts::TAU);
        let dist = self.rng.random_range(0.0..=radius.max(0.0));
        let raw = center + Vec2::from_angle(angle).scale(dist);
        self.body
            .nearest_navigable(raw, radius.max(1.0))
            .unwrap_or(center)
    }

    /// Overwrite the hunger value, for hosts restoring or scripting state.
    pub fn set_hunger(&mut self, value: f32) {
        let current = self.hunger.value();
        self.hunger.add(value - current);
    }

    /// Arena handle.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Level.
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Stats resolved at spawn.
    pub const fn stats(&self) -> &LevelStats {
        &self.stats
    }

    /// Current state.
    pub const fn state(&self) -> BehaviorState {
        self.state
    }

    /// The actor currently being reacted to.
    pub const fn target(&self) -> Option<ActorId> {
        self.target
    }

    /// The corpse being approached or eaten.
    pub const fn eating_target(&self) -> Option<CorpseId> {
        self.eating_target
    }

    /// Seconds spent in the current state.
    pub const fn time_in_state(&self) -> f32 {
        self.time_in_state
    }

    /// Hunger pool.
    pub const fn hunger(&self) -> &HungerPool {
        &self.hunger
    }

    /// Hunger band.
    pub fn hunger_status(&self) -> HungerStatus {
        self.hunger.status()
    }

    /// Stamina pool.
    pub const fn stamina(&self) -> &StaminaPool {
        &self.stamina
    }

    /// Health pool.
    pub const fn health(&self) -> &ResourcePool {
        &self.health
    }

    /// Where the spawner placed this agent; wander points are drawn around it.
    pub const fn spawn_anchor(&self) -> Vec2 {
        self.spawn_anchor
    }

    /// Current position.
    pub fn position(&self) -> Vec2 {
        self.body.position()
    }

    /// Movement body.
    pub const fn body(&self) -> &M {
        &self.body
    }

    /// Movement body, for the host to advance.
    pub const fn body_mut(&mut self) -> &mut M {
        &mut self.body
    }

    /// How other entities see this agent through a direct handle.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn view(&self) -> ActorView {
        ActorView {
            id: ActorId::Agent(self.id),
            level: self.level,
            position: self.position(),
            health: self.health.value().ceil() as u32,
        }
    }

    /// How perception reports this agent.
    pub fn sighting(&self) -> Sighting {
        Sighting {
            entity: EntityRef::Actor(ActorId::Agent(self.id)),
            level: self.level,
            position: self.position(),
        }
    }
}
