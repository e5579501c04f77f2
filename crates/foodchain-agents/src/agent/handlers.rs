//! State handlers.
//!
//! Each handler runs after the agent's pools and speed have been updated
//! for the tick, and may request at most one transition through
//! [`Agent::transition`]. Handlers never block; every wait is a check of
//! `time_in_state` or the attack cooldown.

use core::f32::consts::TAU;

use foodchain_types::{ActorId, BehaviorState, CorpseId, Vec2};
use rand::Rng;

use crate::config::BehaviorConfig;
use crate::corpse::{ClaimError, Corpse};
use crate::perception::{Percept, Scan, scan};
use crate::policy::{Reaction, compare_levels};
use crate::ports::{DamageOutcome, MovementPort, Surroundings};

use super::{Agent, AgentTick};

/// What the Eating handler found when it reached for its corpse.
enum Meal {
    Consuming,
    OutOfReach,
    Gone,
    Refused(ClaimError),
}

impl<M: MovementPort> Agent<M> {
    pub(super) fn run_handler(
        &mut self,
        dt: f32,
        config: &BehaviorConfig,
        world: &mut impl Surroundings,
        report: &mut AgentTick,
    ) {
        match self.state {
            BehaviorState::Idle => self.handle_idle(config, world, report),
            BehaviorState::Wandering => self.handle_wandering(config, world, report),
            BehaviorState::Alert => self.handle_alert(config, world, report),
            BehaviorState::Hunting => self.handle_hunting(config, world, report),
            BehaviorState::Attacking => self.handle_attacking(config, world, report),
            BehaviorState::Fleeing => self.handle_fleeing(config, world, report),
            BehaviorState::Eating => self.handle_eating(dt, config, world, report),
            BehaviorState::Resting => self.handle_resting(config, world, report),
        }
    }

    fn handle_idle(
        &mut self,
        config: &BehaviorConfig,
        world: &mut impl Surroundings,
        report: &mut AgentTick,
    ) {
        let seen = self.perceive(&*world);
        if let Some((actor, percept)) = seen.actor {
            self.react(actor, percept, config, world, report);
            return;
        }
        if self.stamina.is_exhausted() {
            self.transition(BehaviorState::Resting, world, report);
            return;
        }
        if self.time_in_state >= config.idle_timeout_secs {
            self.transition(BehaviorState::Wandering, world, report);
        }
    }

    fn handle_wandering(
        &mut self,
        config: &BehaviorConfig,
        world: &mut impl Surroundings,
        report: &mut AgentTick,
    ) {
        let seen = self.perceive(&*world);
        if let Some((actor, percept)) = seen.actor {
            self.react(actor, percept, config, world, report);
            return;
        }
        if let Some((corpse, _)) = seen.corpse
            && self.hunger.status().is_hungry()
        {
            tracing::debug!(agent = %self.id, corpse = %corpse, hunger = self.hunger.value(), "Heading for corpse");
            self.eating_target = Some(corpse);
            self.transition(BehaviorState::Hunting, world, report);
            return;
        }
        if self.stamina.is_exhausted() {
            self.transition(BehaviorState::Resting, world, report);
            return;
        }
        self.wander(config);
    }

    fn handle_alert(
        &mut self,
        config: &BehaviorConfig,
        world: &mut impl Surroundings,
        report: &mut AgentTick,
    ) {
        self.body.stop();
        let Some(view) = self.target.and_then(|t| world.locate(t)) else {
            self.transition(BehaviorState::Idle, world, report);
            return;
        };

        let distance = self.position().distance(view.position);
        if distance <= self.stats.vision_range {
            let within = distance <= self.stats.attack_range * config.opportunistic_attack_factor;
            let reaction = compare_levels(self.level, view.level, self.hunger.status(), within);
            if reaction != Reaction::Observe {
                self.transition(reaction.state(), world, report);
                return;
            }
        }
        if self.time_in_state >= config.alert_duration_secs {
            self.transition(BehaviorState::Wandering, world, report);
        }
    }

    fn handle_hunting(
        &mut self,
        config: &BehaviorConfig,
        world: &mut impl Surroundings,
        report: &mut AgentTick,
    ) {
        let disengage = self.stats.vision_range * config.disengage_vision_factor;

        if let Some(corpse_id) = self.eating_target {
            let Some(corpse_pos) = world.corpse(corpse_id).map(Corpse::position) else {
                self.transition(BehaviorState::Wandering, world, report);
                return;
            };
            let distance = self.position().distance(corpse_pos);
            if distance <= self.stats.attack_range {
                self.transition(BehaviorState::Eating, world, report);
            } else if distance > disengage {
                self.transition(BehaviorState::Wandering, world, report);
            } else {
                self.move_to(corpse_pos, config);
            }
            return;
        }

        let Some(view) = self.target.and_then(|t| world.locate(t)) else {
            self.transition(BehaviorState::Wandering, world, report);
            return;
        };
        let distance = self.position().distance(view.position);
        if distance <= self.stats.attack_range && self.attack_cooldown <= 0.0 {
            self.transition(BehaviorState::Attacking, world, report);
        } else if distance > disengage {
            self.transition(BehaviorState::Alert, world, report);
        } else {
            self.move_to(view.position, config);
        }
    }

    fn handle_attacking(
        &mut self,
        config: &BehaviorConfig,
        world: &mut impl Surroundings,
        report: &mut AgentTick,
    ) {
        let Some(target) = self.target else {
            self.transition(BehaviorState::Wandering, world, report);
            return;
        };
        let Some(view) = world.locate(target) else {
            self.transition(BehaviorState::Wandering, world, report);
            return;
        };
        self.body.stop();

        if self.position().distance(view.position) > self.stats.attack_range * config.attack_leash_factor {
            self.transition(BehaviorState::Hunting, world, report);
            return;
        }
        if self.attack_cooldown > 0.0 {
            return;
        }

        self.attack_cooldown = self.stats.attack_cooldown_secs;
        match world.apply_damage(target, self.stats.attack_damage) {
            DamageOutcome::Killed { corpse } => {
                tracing::info!(agent = %self.id, level = self.level, victim = %target, "Killed target");
                report.kills.push(target);
                self.target = None;
                self.transition(BehaviorState::Eating, world, report);
                self.eating_target = corpse;
            }
            DamageOutcome::Wounded { remaining } => {
                tracing::debug!(agent = %self.id, victim = %target, remaining, "Hit target");
            }
            DamageOutcome::NoTarget => {
                self.target = None;
                self.transition(BehaviorState::Wandering, world, report);
            }
        }
    }

    fn handle_fleeing(
        &mut self,
        config: &BehaviorConfig,
        world: &mut impl Surroundings,
        report: &mut AgentTick,
    ) {
        let Some(view) = self.target.and_then(|t| world.locate(t)) else {
            self.transition(BehaviorState::Wandering, world, report);
            return;
        };
        let position = self.position();
        if position.distance(view.position) > self.stats.vision_range * config.disengage_vision_factor {
            self.transition(BehaviorState::Alert, world, report);
            return;
        }
        if self.body.has_path() && self.body.remaining_distance() > config.arrival_distance {
            return;
        }
        let away = match (position - view.position).normalized() {
            Some(dir) => dir,
            None => Vec2::from_angle(self.rng.random_range(0.0..TAU)),
        };
        let point = position + away.scale(config.flee_distance);
        let dest = self
            .body
            .nearest_navigable(point, config.flee_sample_radius)
            .unwrap_or(point);
        if !self.body.set_destination(dest) {
            tracing::debug!(agent = %self.id, dest = %dest, "No flee path");
        }
    }

    fn handle_eating(
        &mut self,
        dt: f32,
        config: &BehaviorConfig,
        world: &mut impl Surroundings,
        report: &mut AgentTick,
    ) {
        self.body.stop();
        let Some(corpse_id) = self.eating_target else {
            // No corpse materialized for the kill; digest for a while.
            self.hunger.add(config.fallback_hunger_per_sec * dt);
            if self.time_in_state >= config.eating_duration_secs {
                self.transition(BehaviorState::Wandering, world, report);
            }
            return;
        };

        let me = ActorId::Agent(self.id);
        let reach = self.stats.attack_range * config.corpse_reach_factor;
        let position = self.position();
        let meal = match world.corpse_mut(corpse_id) {
            None => Meal::Gone,
            Some(corpse) if corpse.position().distance(position) > reach => Meal::OutOfReach,
            Some(corpse) => match corpse.begin_consuming(me) {
                Ok(()) => Meal::Consuming,
                Err(err) => Meal::Refused(err),
            },
        };

        match meal {
            Meal::Consuming => {
                self.hunger.add(config.corpse_hunger_per_sec * dt);
            }
            Meal::OutOfReach => self.transition(BehaviorState::Hunting, world, report),
            Meal::Gone => {
                self.eating_target = None;
                self.transition(BehaviorState::Wandering, world, report);
            }
            Meal::Refused(err) => {
                tracing::debug!(agent = %self.id, error = %err, "Corpse claim refused");
                self.eating_target = None;
                self.transition(BehaviorState::Wandering, world, report);
            }
        }
    }

    fn handle_resting(
        &mut self,
        config: &BehaviorConfig,
        world: &mut impl Surroundings,
        report: &mut AgentTick,
    ) {
        if !self.stamina.is_exhausted() && self.stamina.pool().is_full() {
            self.transition(BehaviorState::Wandering, world, report);
            return;
        }
        self.wander(config);
    }

    /// Nearest other actor and nearest corpse not claimed by someone else.
    fn perceive(&self, world: &impl Surroundings) -> Scan {
        let me = ActorId::Agent(self.id);
        let origin = self.position();
        let sightings = world.query_nearby(origin, self.stats.vision_range);
        scan(origin, me, &sightings, |id: CorpseId| {
            world.corpse(id).is_some_and(|c| {
                !c.phase().is_terminal() && c.consumer().is_none_or(|holder| holder == me)
            })
        })
    }

    /// Apply the level policy to a perceived actor and enter the chosen state.
    fn react(
        &mut self,
        actor: ActorId,
        percept: Percept,
        config: &BehaviorConfig,
        world: &mut impl Surroundings,
        report: &mut AgentTick,
    ) {
        let within = percept.distance <= self.stats.attack_range * config.opportunistic_attack_factor;
        let reaction = compare_levels(self.level, percept.sighting.level, self.hunger.status(), within);
        tracing::debug!(
            agent = %self.id,
            other = %actor,
            own_level = self.level,
            other_level = percept.sighting.level,
            reaction = ?reaction,
            "Reacting to actor"
        );
        self.eating_target = None;
        self.target = Some(actor);
        self.transition(reaction.state(), world, report);
    }

    /// Keep moving between random points around the spawn anchor.
    fn wander(&mut self, config: &BehaviorConfig) {
        if self.body.has_path() && self.body.remaining_distance() > config.arrival_distance {
            return;
        }
        let point = self.random_point_near(self.spawn_anchor, config.wander_radius);
        self.body.set_destination(point);
    }

    fn move_to(&mut self, point: Vec2, config: &BehaviorConfig) {
        let dest = self
            .body
            .nearest_navigable(point, config.flee_sample_radius)
            .unwrap_or(point);
        if !self.body.set_destination(dest) {
            tracing::debug!(agent = %self.id, dest = %dest, "No path to destination");
        }
    }
}
