//! The world arena: agents, corpses and the player.
//!
//! Entities live in ordered maps keyed by handles drawn from monotonic
//! counters. Handles are never reused, so a lookup that misses means the
//! entity is gone for good. The world implements every port the agent core
//! consumes, which makes it the only path by which one actor can affect
//! another.
//!
//! While an agent is being ticked the scheduler takes it out of the arena
//! ([`World::take_agent`]) and puts it back afterwards
//! ([`World::restore_agent`]). During that window the agent cannot observe
//! or damage itself.

use std::collections::BTreeMap;
use std::sync::Arc;

use foodchain_agents::{
    Agent, AgentInit, BehaviorConfig, CombatSink, Corpse, CorpseConfig, DamageOutcome,
    HungerConfig, Payout, RewardSink, SpatialQuery, StaminaConfig, StatTable, Surroundings,
    clamp_level,
};
use foodchain_types::{ActorId, ActorView, AgentId, CorpseId, EntityRef, PlayerId, Sighting, Vec2};

use crate::config::PlayerConfig;
use crate::nav::{NavBody, Terrain};
use crate::player::{Player, PlayerInput};

/// What happened during the corpse phase of a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorpsePhaseReport {
    /// Corpses fully consumed this tick.
    pub completed: u32,
    /// Corpses that expired this tick.
    pub expired: u32,
    /// Agents that left Eating because their corpse was finished.
    pub transitions: u32,
}

/// What happened to the player this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerPhaseReport {
    /// The player died from health decay.
    pub died: bool,
    /// The player started or resumed consuming a corpse.
    pub claimed: Option<CorpseId>,
    /// Agents hit by the player's attack.
    pub hits: u32,
    /// Agents killed by the player's attack.
    pub kills: u32,
}

/// Every live entity in the simulation.
#[derive(Debug)]
pub struct World {
    terrain: Arc<Terrain>,
    agents: BTreeMap<AgentId, Agent<NavBody>>,
    corpses: BTreeMap<CorpseId, Corpse>,
    player: Option<Player>,
    stats: StatTable,
    corpse_config: CorpseConfig,
    next_agent: u64,
    next_corpse: u64,
    next_player: u64,
    deaths: u64,
}

impl World {
    /// Create an empty world over `terrain`.
    pub fn new(terrain: Terrain, stats: StatTable, corpse_config: CorpseConfig) -> Self {
        Self {
            terrain: Arc::new(terrain),
            agents: BTreeMap::new(),
            corpses: BTreeMap::new(),
            player: None,
            stats,
            corpse_config,
            next_agent: 1,
            next_corpse: 1,
            next_player: 1,
            deaths: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Population
    // -----------------------------------------------------------------------

    /// Spawn an agent of `level` at `position`.
    ///
    /// Levels below 1 are clamped to 1 and logged.
    pub fn spawn_agent(
        &mut self,
        level: i64,
        position: Vec2,
        initial_hunger: f32,
        seed: u64,
        hunger: &HungerConfig,
        stamina: &StaminaConfig,
    ) -> AgentId {
        let (level, fault) = clamp_level(level);
        if let Some(err) = fault {
            tracing::warn!(error = %err, "Clamping spawn level");
        }
        let id = AgentId::new(self.next_agent);
        self.next_agent = self.next_agent.saturating_add(1);
        let init = AgentInit {
            id,
            level,
            stats: self.stats.get(level),
            initial_hunger,
            seed,
        };
        let body = NavBody::new(Arc::clone(&self.terrain), position);
        let agent = Agent::new(init, body, hunger, stamina);
        tracing::debug!(agent = %id, level, position = %position, hunger = initial_hunger, "Agent spawned");
        self.agents.insert(id, agent);
        id
    }

    /// Place the player. Replaces any previous player.
    pub fn add_player(&mut self, config: &PlayerConfig) -> PlayerId {
        let id = PlayerId::new(self.next_player);
        self.next_player = self.next_player.saturating_add(1);
        let player = Player::new(id, config);
        tracing::info!(player = %id, level = player.level(), position = %player.position(), "Player joined");
        self.player = Some(player);
        id
    }

    /// Handles of all live agents, in ascending order.
    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.agents.keys().copied().collect()
    }

    /// Remove an agent from the arena for its tick.
    pub fn take_agent(&mut self, id: AgentId) -> Option<Agent<NavBody>> {
        self.agents.remove(&id)
    }

    /// Put back an agent taken with [`World::take_agent`].
    pub fn restore_agent(&mut self, agent: Agent<NavBody>) {
        self.agents.insert(agent.id(), agent);
    }

    /// Drop an agent for good without leaving a corpse, releasing any
    /// claim it held.
    pub fn discard_agent(&mut self, id: AgentId) {
        self.agents.remove(&id);
        self.release_claims(ActorId::Agent(id));
    }

    /// A live agent.
    pub fn agent(&self, id: AgentId) -> Option<&Agent<NavBody>> {
        self.agents.get(&id)
    }

    /// A live agent, mutably.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent<NavBody>> {
        self.agents.get_mut(&id)
    }

    /// Iterate live agents in handle order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent<NavBody>> {
        self.agents.values()
    }

    /// Number of live agents.
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Iterate live corpses in handle order.
    pub fn corpses(&self) -> impl Iterator<Item = &Corpse> {
        self.corpses.values()
    }

    /// Number of live corpses.
    pub fn corpse_count(&self) -> usize {
        self.corpses.len()
    }

    /// The player, if alive.
    pub const fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    /// The terrain.
    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    /// Actors killed since the world was created.
    pub const fn deaths(&self) -> u64 {
        self.deaths
    }

    /// Leave a corpse for `source` at `position`.
    pub fn spawn_corpse(&mut self, source: ActorId, level: u32, position: Vec2) -> CorpseId {
        let id = CorpseId::new(self.next_corpse);
        self.next_corpse = self.next_corpse.saturating_add(1);
        let stats = self.stats.get(level);
        let corpse = Corpse::new(
            id,
            source,
            level,
            position,
            stats.corpse_heal,
            stats.corpse_currency,
            &self.corpse_config,
        );
        self.corpses.insert(id, corpse);
        id
    }

    /// Pause every corpse claimed by `actor`. Owed payouts are dropped,
    /// since the actor is gone.
    fn release_claims(&mut self, actor: ActorId) {
        for corpse in self.corpses.values_mut() {
            if corpse.consumer() == Some(actor) {
                corpse.pause_consuming(actor);
            }
        }
    }

    /// Remove a dead actor and leave its corpse.
    fn kill(&mut self, target: ActorId) -> Option<CorpseId> {
        let (level, position) = match target {
            ActorId::Agent(id) => {
                let agent = self.agents.remove(&id)?;
                (agent.level(), agent.position())
            }
            ActorId::Player(id) => {
                let player = self.player.take_if(|p| p.id() == id)?;
                (player.level(), player.position())
            }
        };
        self.release_claims(target);
        self.deaths = self.deaths.saturating_add(1);
        let corpse = self.spawn_corpse(target, level, position);
        tracing::info!(victim = %target, level, corpse = %corpse, position = %position, "Actor killed");
        Some(corpse)
    }

    // -----------------------------------------------------------------------
    // Player phase
    // -----------------------------------------------------------------------

    /// Apply input, attack, health decay and hold-to-consume for the player.
    pub fn update_player(&mut self, dt: f32, input: &PlayerInput) -> PlayerPhaseReport {
        let mut report = PlayerPhaseReport::default();
        let Some(player) = self.player.as_mut() else {
            return report;
        };
        let id = player.id();

        if let Some(point) = input.move_to {
            if self.terrain.is_navigable(point) {
                player.set_position(point);
            } else {
                tracing::debug!(player = %id, point = %point, "Ignoring move to unwalkable point");
            }
        }
        player.set_consume_held(input.consume_held);
        player.cool_down(dt);
        if input.attack && player.try_attack() {
            self.player_attack(&mut report);
        }

        let Some(player) = self.player.as_mut() else {
            return report;
        };
        player.decay(dt);
        if player.is_dead() {
            tracing::info!(player = %id, "Player starved");
            self.kill(ActorId::Player(id));
            report.died = true;
            return report;
        }

        report.claimed = self.update_player_consumption();
        report
    }

    /// Strike every agent within the player's attack range. Kills go
    /// through [`CombatSink::apply_damage`] and leave corpses.
    fn player_attack(&mut self, report: &mut PlayerPhaseReport) {
        let Some(player) = self.player.as_ref() else {
            return;
        };
        let (me, origin, range, damage) = (
            player.id(),
            player.position(),
            player.attack_range(),
            player.attack_damage(),
        );
        let victims: Vec<AgentId> = self
            .agents
            .values()
            .filter(|a| a.position().distance(origin) <= range)
            .map(Agent::id)
            .collect();
        if victims.is_empty() {
            tracing::debug!(player = %me, "Player attack hit nothing");
            return;
        }
        for victim in victims {
            report.hits = report.hits.saturating_add(1);
            let outcome = self.apply_damage(ActorId::Agent(victim), damage);
            if matches!(outcome, DamageOutcome::Killed { .. }) {
                report.kills = report.kills.saturating_add(1);
            }
        }
        tracing::debug!(player = %me, hits = report.hits, kills = report.kills, "Player attacked");
    }

    /// Claim the current or nearest corpse in reach while consume is held;
    /// pause the claim when released or out of reach.
    fn update_player_consumption(&mut self) -> Option<CorpseId> {
        let player = self.player.as_ref()?;
        let me = ActorId::Player(player.id());
        let (position, range, held, current) = (
            player.position(),
            player.consume_range(),
            player.consume_held(),
            player.consuming(),
        );

        if let Some(corpse_id) = current {
            let in_reach = self
                .corpses
                .get(&corpse_id)
                .is_some_and(|c| !c.phase().is_terminal() && c.position().distance(position) <= range);
            if held && in_reach {
                return Some(corpse_id);
            }
            let payout = self
                .corpses
                .get_mut(&corpse_id)
                .and_then(|c| c.pause_consuming(me));
            if let Some(payout) = payout {
                self.route_payout(&payout);
            }
            if let Some(player) = self.player.as_mut() {
                player.set_consuming(None);
            }
        }
        if !held {
            return None;
        }

        let candidate = self
            .corpses
            .values()
            .filter(|c| !c.phase().is_terminal())
            .filter(|c| c.consumer().is_none_or(|holder| holder == me))
            .map(|c| (c.id(), c.position().distance(position)))
            .filter(|(_, d)| *d <= range)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)?;
        let corpse = self.corpses.get_mut(&candidate)?;
        match corpse.begin_consuming(me) {
            Ok(()) => {
                if let Some(player) = self.player.as_mut() {
                    player.set_consuming(Some(candidate));
                }
                Some(candidate)
            }
            Err(err) => {
                tracing::debug!(player = %me, error = %err, "Player claim refused");
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Corpse phase
    // -----------------------------------------------------------------------

    /// Advance every corpse, deliver payouts, and remove finished or
    /// expired corpses.
    pub fn tick_corpses(&mut self, dt: f32, behavior: &BehaviorConfig) -> CorpsePhaseReport {
        let mut report = CorpsePhaseReport::default();
        let ids: Vec<CorpseId> = self.corpses.keys().copied().collect();
        for id in ids {
            let Some(corpse) = self.corpses.get_mut(&id) else {
                continue;
            };
            let outcome = corpse.tick(dt);
            if let Some(payout) = outcome.payout {
                self.route_payout(&payout);
            }
            if let Some(consumer) = outcome.completed_by {
                report.completed = report.completed.saturating_add(1);
                match consumer {
                    ActorId::Agent(agent) => {
                        if let Some(agent) = self.agents.get_mut(&agent)
                            && agent.finish_meal(behavior).is_some()
                        {
                            report.transitions = report.transitions.saturating_add(1);
                        }
                    }
                    ActorId::Player(_) => {
                        if let Some(player) = self.player.as_mut() {
                            player.set_consuming(None);
                            tracing::info!(player = %consumer, currency = player.currency(), "Player finished corpse");
                        }
                    }
                }
            }
            if outcome.expired {
                report.expired = report.expired.saturating_add(1);
            }
        }
        self.corpses.retain(|_, c| !c.phase().is_terminal());
        report
    }

    /// Deliver a payout to whoever earned it. Payouts to actors that no
    /// longer exist are dropped.
    pub fn route_payout(&mut self, payout: &Payout) {
        match payout.consumer {
            ActorId::Agent(id) => {
                if let Some(agent) = self.agents.get_mut(&id) {
                    agent.receive_payout(payout);
                }
            }
            ActorId::Player(id) => {
                self.grant_heal(id, payout.heal);
                self.grant_currency(id, payout.currency);
            }
        }
    }
}

impl SpatialQuery for World {
    fn query_nearby(&self, origin: Vec2, radius: f32) -> Vec<Sighting> {
        let within = |p: Vec2| p.distance(origin) <= radius;
        let agents = self
            .agents
            .values()
            .filter(|a| within(a.position()))
            .map(Agent::sighting);
        let player = self
            .player
            .iter()
            .filter(|p| within(p.position()))
            .map(Player::sighting);
        let corpses = self
            .corpses
            .values()
            .filter(|c| !c.phase().is_terminal() && within(c.position()))
            .map(|c| Sighting {
                entity: EntityRef::Corpse(c.id()),
                level: c.level(),
                position: c.position(),
            });
        agents.chain(player).chain(corpses).collect()
    }
}

impl CombatSink for World {
    fn apply_damage(&mut self, target: ActorId, amount: f32) -> DamageOutcome {
        let remaining = match target {
            ActorId::Agent(id) => match self.agents.get_mut(&id) {
                Some(agent) => agent.take_damage(amount),
                None => return DamageOutcome::NoTarget,
            },
            ActorId::Player(id) => match self.player.as_mut().filter(|p| p.id() == id) {
                Some(player) => player.take_damage(amount),
                None => return DamageOutcome::NoTarget,
            },
        };
        if remaining > 0.0 {
            tracing::debug!(target = %target, amount, remaining, "Damage applied");
            return DamageOutcome::Wounded { remaining };
        }
        DamageOutcome::Killed {
            corpse: self.kill(target),
        }
    }

    fn is_dead(&self, target: ActorId) -> bool {
        self.locate(target).is_none_or(|view| view.is_dead())
    }
}

impl Surroundings for World {
    fn locate(&self, actor: ActorId) -> Option<ActorView> {
        match actor {
            ActorId::Agent(id) => self.agents.get(&id).map(Agent::view),
            ActorId::Player(id) => self
                .player
                .as_ref()
                .filter(|p| p.id() == id)
                .map(Player::view),
        }
    }

    fn corpse(&self, id: CorpseId) -> Option<&Corpse> {
        self.corpses.get(&id)
    }

    fn corpse_mut(&mut self, id: CorpseId) -> Option<&mut Corpse> {
        self.corpses.get_mut(&id)
    }
}

impl RewardSink for World {
    fn grant_heal(&mut self, player: PlayerId, amount: u32) {
        if let Some(p) = self.player.as_mut().filter(|p| p.id() == player) {
            p.heal(amount);
        }
    }

    fn grant_currency(&mut self, player: PlayerId, amount: u32) {
        if let Some(p) = self.player.as_mut().filter(|p| p.id() == player) {
            p.add_currency(amount);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
mod tests {
    use foodchain_agents::CorpsePhase;

    use super::*;

    fn world() -> World {
        World::new(Terrain::open(50.0), StatTable::formula(), CorpseConfig::default())
    }

    fn spawn(world: &mut World, level: i64, x: f32) -> AgentId {
        world.spawn_agent(
            level,
            Vec2::new(x, 0.0),
            80.0,
            7,
            &HungerConfig::default(),
            &StaminaConfig::default(),
        )
    }

    #[test]
    fn handles_are_never_reused() {
        let mut w = world();
        let a = spawn(&mut w, 1, 0.0);
        w.discard_agent(a);
        let b = spawn(&mut w, 1, 0.0);
        assert_ne!(a, b);
        assert!(w.locate(ActorId::Agent(a)).is_none());
    }

    #[test]
    fn invalid_levels_are_clamped_at_spawn() {
        let mut w = world();
        let id = spawn(&mut w, -3, 0.0);
        assert_eq!(w.agent(id).unwrap().level(), 1);
    }

    #[test]
    fn lethal_damage_leaves_a_corpse_with_stat_budgets() {
        let mut w = world();
        let victim = spawn(&mut w, 2, 3.0);
        let outcome = w.apply_damage(ActorId::Agent(victim), 10.0);
        assert!(matches!(outcome, DamageOutcome::Wounded { .. }));

        let outcome = w.apply_damage(ActorId::Agent(victim), 1000.0);
        assert!(matches!(outcome, DamageOutcome::Killed { corpse: Some(_) }));
        assert!(w.is_dead(ActorId::Agent(victim)));
        assert_eq!(w.deaths(), 1);
        let corpse = w.corpses().next().unwrap();
        assert_eq!(corpse.heal_budget(), 20);
        assert_eq!(corpse.currency_budget(), 10);
        assert_eq!(corpse.source(), ActorId::Agent(victim));
        assert_eq!(
            w.apply_damage(ActorId::Agent(victim), 1.0),
            DamageOutcome::NoTarget
        );
    }

    #[test]
    fn query_nearby_reports_agents_player_and_corpses_in_radius() {
        let mut w = world();
        let near = spawn(&mut w, 1, 2.0);
        spawn(&mut w, 1, 40.0);
        w.add_player(&PlayerConfig::default());
        w.spawn_corpse(ActorId::Agent(AgentId::new(99)), 1, Vec2::new(-3.0, 0.0));

        let seen = w.query_nearby(Vec2::ZERO, 10.0);
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().any(|s| s.actor() == Some(ActorId::Agent(near))));
        assert!(seen.iter().any(|s| s.corpse().is_some()));
    }

    #[test]
    fn dead_agents_release_their_claims() {
        let mut w = world();
        let eater = spawn(&mut w, 1, 0.0);
        let corpse = w.spawn_corpse(ActorId::Agent(AgentId::new(99)), 1, Vec2::ZERO);
        w.corpse_mut(corpse)
            .unwrap()
            .begin_consuming(ActorId::Agent(eater))
            .unwrap();
        w.apply_damage(ActorId::Agent(eater), 1000.0);
        assert_eq!(w.corpse(corpse).unwrap().consumer(), None);
    }

    #[test]
    fn player_hold_to_consume_claims_and_releases() {
        let mut w = world();
        w.add_player(&PlayerConfig::default());
        let corpse = w.spawn_corpse(ActorId::Agent(AgentId::new(99)), 2, Vec2::new(1.0, 0.0));

        let held = PlayerInput {
            consume_held: true,
            ..PlayerInput::default()
        };
        let report = w.update_player(0.1, &held);
        assert_eq!(report.claimed, Some(corpse));
        assert!(w.corpse(corpse).unwrap().consumer().is_some());

        for _ in 0..25 {
            w.update_player(0.1, &held);
            w.tick_corpses(0.1, &BehaviorConfig::default());
        }
        let released = w.update_player(0.1, &PlayerInput::default());
        assert_eq!(released.claimed, None);
        let c = w.corpse(corpse).unwrap();
        assert_eq!(c.consumer(), None);
        assert!(c.progress() > 0.4 && c.progress() < 0.6);
        assert_eq!(w.player().unwrap().currency(), u64::from(c.granted_currency()));
    }

    #[test]
    fn player_out_of_reach_does_not_claim() {
        let mut w = world();
        w.add_player(&PlayerConfig::default());
        let corpse = w.spawn_corpse(ActorId::Agent(AgentId::new(99)), 1, Vec2::new(10.0, 0.0));
        let held = PlayerInput {
            consume_held: true,
            ..PlayerInput::default()
        };
        assert_eq!(w.update_player(0.1, &held).claimed, None);
        assert_eq!(w.corpse(corpse).unwrap().consumer(), None);
    }

    #[test]
    fn player_attack_kills_in_range_and_respects_cooldown() {
        let mut w = world();
        w.add_player(&PlayerConfig::default());
        let near = spawn(&mut w, 1, 1.0);
        let far = spawn(&mut w, 1, 5.0);
        let health = w.agent(near).unwrap().health().value();
        let attack = PlayerInput {
            attack: true,
            ..PlayerInput::default()
        };

        let mut kills = 0;
        let mut hits = 0;
        let mut ticks = 0;
        while w.agent(near).is_some() && ticks < 100 {
            let report = w.update_player(0.1, &attack);
            hits += report.hits;
            kills += report.kills;
            ticks += 1;
        }
        assert_eq!(kills, 1);
        assert!(w.agent(near).is_none());
        assert!(w.agent(far).is_some());
        assert_eq!(w.deaths(), 1);
        let corpse = w.corpses().next().unwrap();
        assert_eq!(corpse.source(), ActorId::Agent(near));

        // 20 damage per hit, one hit per 0.5 s.
        let needed = (health / 20.0).ceil() as u32;
        assert_eq!(hits, needed);
        assert!(ticks >= (needed - 1) * 5 + 1, "too many hits in {ticks} ticks");
    }

    #[test]
    fn player_attack_cooldown_blocks_an_immediate_second_hit() {
        let mut w = world();
        w.add_player(&PlayerConfig::default());
        let victim = spawn(&mut w, 5, 1.0);
        let attack = PlayerInput {
            attack: true,
            ..PlayerInput::default()
        };
        assert_eq!(w.update_player(0.1, &attack).hits, 1);
        let after_first = w.agent(victim).unwrap().health().value();
        assert_eq!(w.update_player(0.1, &attack).hits, 0);
        assert!((w.agent(victim).unwrap().health().value() - after_first).abs() < f32::EPSILON);
    }

    #[test]
    fn killed_player_leaves_a_corpse() {
        let mut w = world();
        let player = w.add_player(&PlayerConfig::default());
        let outcome = w.apply_damage(ActorId::Player(player), 500.0);
        assert!(matches!(outcome, DamageOutcome::Killed { corpse: Some(_) }));
        assert!(w.player().is_none());
        assert_eq!(w.corpse_count(), 1);
        assert!(w.is_dead(ActorId::Player(player)));
    }

    #[test]
    fn expired_corpses_are_removed() {
        let mut w = world();
        w.spawn_corpse(ActorId::Agent(AgentId::new(99)), 1, Vec2::ZERO);
        let mut expired = 0;
        for _ in 0..601 {
            expired += w.tick_corpses(0.1, &BehaviorConfig::default()).expired;
        }
        assert_eq!(expired, 1);
        assert_eq!(w.corpse_count(), 0);
        assert!(w.corpses().all(|c| c.phase() != CorpsePhase::Expired));
    }
}
