//! Tick cycle: the fixed-step scheduler that drives the Foodchain simulation.
//!
//! Each tick runs through these phases:
//!
//! 1. **Clock** -- advance the fixed-step clock.
//! 2. **Player** -- apply host input, attack, health decay and hold-to-consume.
//! 3. **Agents** -- tick every agent that was alive when the phase began,
//!    then move its body. Agents killed earlier in the phase are skipped.
//!    An agent that reports a corrupt state is removed; nothing an agent
//!    does can fail the tick.
//! 4. **Corpses** -- advance consumption, deliver payouts and complete or
//!    expire corpses.
//! 5. **Respawn** -- possibly top up the population.
//!
//! Given the same configuration and player input, a run is deterministic.

use std::collections::BTreeMap;

use foodchain_agents::{AgentError, StatTable};
use foodchain_types::{AgentId, BehaviorState, Vec2};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;
use tracing::{debug, warn};

use crate::clock::{ClockError, SimClock};
use crate::config::SimulationConfig;
use crate::nav::Terrain;
use crate::player::PlayerInput;
use crate::spawner::{self, SpawnError};
use crate::world::World;

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Simulated seconds since the start.
    pub elapsed_secs: f64,
    /// Number of living agents at end of tick.
    pub alive_agents: usize,
    /// Number of corpses at end of tick.
    pub corpses: usize,
    /// Whether the player is alive at end of tick.
    pub player_alive: bool,
    /// Player health, if alive.
    pub player_health: Option<f32>,
    /// Player evolution points, if alive.
    pub player_currency: Option<u64>,
    /// Actors that died this tick.
    pub deaths: u64,
    /// Actors that died since the start.
    pub total_deaths: u64,
    /// Kills credited to agents this tick.
    pub kills: u32,
    /// Agents killed by the player this tick.
    pub player_kills: u32,
    /// State transitions made this tick.
    pub transitions: u32,
    /// Agents that re-pathed after being stuck.
    pub unstuck: u32,
    /// Corpses fully consumed this tick.
    pub completed_corpses: u32,
    /// Corpses that expired this tick.
    pub expired_corpses: u32,
    /// Agents spawned this tick.
    pub spawned: u32,
    /// Agents removed after an unrecoverable fault.
    pub removed_faulty: u32,
    /// Number of agents in each behavior state at end of tick.
    pub states: BTreeMap<BehaviorState, u32>,
}

impl TickSummary {
    /// No agents and no player remain.
    pub const fn is_extinct(&self) -> bool {
        self.alive_agents == 0 && !self.player_alive
    }
}

/// The mutable simulation state passed through the tick cycle.
#[derive(Debug)]
pub struct SimulationState {
    /// The fixed-step clock.
    pub clock: SimClock,
    /// Agents, corpses and the player.
    pub world: World,
    /// The configuration the state was built from.
    pub config: SimulationConfig,
    /// Input applied to the player on the next tick.
    pub player_input: PlayerInput,
    /// Seeded source for spawning.
    rng: SmallRng,
}

impl SimulationState {
    /// Build the clock, terrain, world and player from configuration. The
    /// world starts without agents; see [`SimulationState::populate`].
    pub fn new(config: SimulationConfig) -> Result<Self, ClockError> {
        let clock = SimClock::new(config.world.tick_secs)?;
        let mut rng = SmallRng::seed_from_u64(config.world.seed);
        let start = Vec2::new(config.player.start_x, config.player.start_z);
        let terrain = Terrain::generate(
            &mut rng,
            config.world.half_extent,
            config.world.obstacle_count,
            config.world.obstacle_min_radius,
            config.world.obstacle_max_radius,
            start,
        );
        Ok(Self::with_terrain(config, clock, terrain, rng))
    }

    /// Build a state over an explicit terrain.
    pub fn with_terrain(
        config: SimulationConfig,
        clock: SimClock,
        terrain: Terrain,
        rng: SmallRng,
    ) -> Self {
        let stats = StatTable::with_overrides(config.population.stat_overrides.clone());
        let mut world = World::new(terrain, stats, config.corpse.clone());
        if config.player.enabled {
            world.add_player(&config.player);
        }
        Self {
            clock,
            world,
            config,
            player_input: PlayerInput::default(),
            rng,
        }
    }

    /// Spawn the initial population.
    pub fn populate(&mut self) -> Result<u32, SpawnError> {
        spawner::spawn_initial(&mut self.rng, &mut self.world, &self.config)
    }
}

/// Execute one complete tick of the simulation.
pub fn run_tick(state: &mut SimulationState) -> Result<TickSummary, TickError> {
    // --- Phase 1: Clock ---
    let tick = state.clock.advance()?;
    let dt = state.clock.step_secs();
    let deaths_before = state.world.deaths();
    let mut summary = TickSummary {
        tick,
        elapsed_secs: state.clock.elapsed_secs(),
        ..TickSummary::default()
    };

    // --- Phase 2: Player ---
    let input = state.player_input;
    let player = state.world.update_player(dt, &input);
    if player.died {
        debug!(tick, "Player died this tick");
    }
    summary.player_kills = player.kills;

    // --- Phase 3: Agents ---
    phase_agents(state, dt, &mut summary);

    // --- Phase 4: Corpses ---
    let corpses = state.world.tick_corpses(dt, &state.config.behavior);
    summary.completed_corpses = corpses.completed;
    summary.expired_corpses = corpses.expired;
    summary.transitions = summary.transitions.saturating_add(corpses.transitions);

    // --- Phase 5: Respawn ---
    if spawner::maybe_respawn(&mut state.rng, &mut state.world, &state.config, dt).is_some() {
        summary.spawned = 1;
    }

    let world = &state.world;
    summary.alive_agents = world.agent_count();
    summary.corpses = world.corpse_count();
    summary.player_alive = world.player().is_some();
    summary.player_health = world.player().map(|p| p.health().value());
    summary.player_currency = world.player().map(crate::player::Player::currency);
    summary.total_deaths = world.deaths();
    summary.deaths = world.deaths().saturating_sub(deaths_before);
    summary.states = census(world);
    Ok(summary)
}

/// Phase 3: tick each agent alive at the start of the phase.
///
/// The agent is taken out of the arena while it runs so the world can be
/// lent to it mutably; handles that no longer resolve (the agent was killed
/// by an earlier agent this tick) are skipped.
fn phase_agents(state: &mut SimulationState, dt: f32, summary: &mut TickSummary) {
    let ids: Vec<AgentId> = state.world.agent_ids();
    for id in ids {
        let Some(mut agent) = state.world.take_agent(id) else {
            continue;
        };
        match agent.tick(dt, &state.config.behavior, &mut state.world) {
            Ok(report) => {
                agent.body_mut().advance(dt);
                summary.transitions = summary
                    .transitions
                    .saturating_add(u32::try_from(report.transitions.len()).unwrap_or(u32::MAX));
                summary.kills = summary
                    .kills
                    .saturating_add(u32::try_from(report.kills.len()).unwrap_or(u32::MAX));
                if report.unstuck {
                    summary.unstuck = summary.unstuck.saturating_add(1);
                }
                state.world.restore_agent(agent);
            }
            Err(err @ AgentError::CorruptState { .. }) => {
                warn!(agent = %id, error = %err, "Removing agent after unrecoverable fault");
                state.world.discard_agent(id);
                summary.removed_faulty = summary.removed_faulty.saturating_add(1);
            }
            Err(err) => {
                debug!(agent = %id, error = %err, "Agent reported a recoverable fault");
                agent.body_mut().advance(dt);
                state.world.restore_agent(agent);
            }
        }
    }
}

/// Count agents per behavior state.
pub fn census(world: &World) -> BTreeMap<BehaviorState, u32> {
    let mut states = BTreeMap::new();
    for agent in world.agents() {
        let count = states.entry(agent.state()).or_insert(0_u32);
        *count = count.saturating_add(1);
    }
    states
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn quiet_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.world.obstacle_count = 0;
        config.population.respawn_chance_per_sec = 0.0;
        config
    }

    #[test]
    fn tick_advances_clock_and_reports_population() {
        let mut state = SimulationState::new(quiet_config()).unwrap();
        let spawned = state.populate().unwrap();
        let summary = run_tick(&mut state).unwrap();
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.alive_agents, usize::try_from(spawned).unwrap());
        assert!(summary.player_alive);
        assert_eq!(
            summary.states.values().sum::<u32>(),
            u32::try_from(summary.alive_agents).unwrap()
        );
    }

    #[test]
    fn same_seed_same_run() {
        let run = || {
            let mut state = SimulationState::new(SimulationConfig::default()).unwrap();
            state.populate().unwrap();
            let mut last = TickSummary::default();
            for _ in 0..200 {
                last = run_tick(&mut state).unwrap();
            }
            let positions: Vec<Vec2> = state.world.agents().map(|a| a.position()).collect();
            (last, positions)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn empty_world_without_player_is_extinct() {
        let mut config = quiet_config();
        config.player.enabled = false;
        config.population.initial_agents = 0;
        let mut state = SimulationState::new(config).unwrap();
        let summary = run_tick(&mut state).unwrap();
        assert!(summary.is_extinct());
    }

    fn lone_agent_state() -> SimulationState {
        let mut config = quiet_config();
        config.player.enabled = false;
        config.population.initial_agents = 0;
        SimulationState::new(config).unwrap()
    }

    #[test]
    fn finishing_a_corpse_counts_as_a_transition() {
        let mut state = lone_agent_state();
        let (hunger, stamina) = (state.config.hunger.clone(), state.config.stamina.clone());
        let eater = state.world.spawn_agent(2, Vec2::ZERO, 30.0, 5, &hunger, &stamina);
        state.world.spawn_corpse(
            foodchain_types::ActorId::Agent(AgentId::new(999)),
            1,
            Vec2::new(1.0, 0.0),
        );

        let mut finished = None;
        for _ in 0..300 {
            let before = state.world.agent(eater).unwrap().state();
            let summary = run_tick(&mut state).unwrap();
            if summary.completed_corpses == 1 {
                finished = Some((before, summary));
                break;
            }
        }
        let (before, summary) = finished.unwrap();
        assert_eq!(before, BehaviorState::Eating);
        assert_eq!(state.world.agent(eater).unwrap().state(), BehaviorState::Wandering);
        assert_eq!(summary.transitions, 1);
    }

    #[test]
    fn player_kills_are_reported() {
        let mut config = quiet_config();
        config.population.initial_agents = 0;
        // A rooted, short-sighted target that never reacts to the player.
        config.population.stat_overrides = BTreeMap::from([(
            1,
            foodchain_agents::LevelStats {
                walk_speed: 0.0,
                run_speed: 0.0,
                vision_range: 0.5,
                ..foodchain_agents::LevelStats::for_level(1)
            },
        )]);
        let mut state = SimulationState::new(config).unwrap();
        let (hunger, stamina) = (state.config.hunger.clone(), state.config.stamina.clone());
        state.world.spawn_agent(1, Vec2::new(1.0, 0.0), 90.0, 5, &hunger, &stamina);
        state.player_input.attack = true;

        let mut player_kills = 0;
        for _ in 0..40 {
            player_kills += run_tick(&mut state).unwrap().player_kills;
        }
        assert_eq!(player_kills, 1);
        assert_eq!(state.world.agent_count(), 0);
    }

    #[test]
    fn summary_serializes_states_by_name() {
        let mut summary = TickSummary::default();
        summary.states.insert(BehaviorState::Hunting, 2);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["states"]["Hunting"], 2);
    }
}
