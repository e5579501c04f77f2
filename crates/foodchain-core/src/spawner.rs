//! Agent spawner.
//!
//! Places the initial population and tops it up over time. Levels are
//! drawn from the configured weight table; positions are drawn uniformly
//! inside the world bounds and rejected if they are unwalkable, too close
//! to the player, or too close to another agent.

use std::collections::BTreeMap;

use foodchain_agents::{HungerConfig, StaminaConfig};
use foodchain_types::{AgentId, Vec2};
use rand::Rng;

use crate::config::SimulationConfig;
use crate::world::World;

/// Keeps spawn points off the very edge of the world.
const EDGE_MARGIN: f32 = 1.0;

/// Errors that can occur while spawning.
#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    /// The level weight table has no positive weight.
    #[error("no level has a positive spawn weight")]
    NoWeights,

    /// No acceptable position was found within the attempt budget.
    #[error("no spawn point found after {attempts} attempts")]
    NoSpawnPoint {
        /// How many positions were tried.
        attempts: u32,
    },
}

/// Pick a level with probability proportional to its weight.
pub fn pick_level(rng: &mut impl Rng, weights: &BTreeMap<u32, u32>) -> Result<u32, SpawnError> {
    let total: u64 = weights.values().map(|w| u64::from(*w)).sum();
    if total == 0 {
        return Err(SpawnError::NoWeights);
    }
    let mut roll = rng.random_range(0..total);
    for (level, weight) in weights {
        let weight = u64::from(*weight);
        if roll < weight {
            return Ok(*level);
        }
        roll = roll.saturating_sub(weight);
    }
    Err(SpawnError::NoWeights)
}

/// Find a walkable point respecting the configured minimum distances.
pub fn find_spawn_point(
    rng: &mut impl Rng,
    world: &World,
    config: &SimulationConfig,
) -> Result<Vec2, SpawnError> {
    let population = &config.population;
    let extent = (world.terrain().half_extent() - EDGE_MARGIN).max(0.0);
    let player = world.player().map(crate::player::Player::position);
    for _ in 0..population.spawn_attempts {
        let point = Vec2::new(
            rng.random_range(-extent..=extent),
            rng.random_range(-extent..=extent),
        );
        if !world.terrain().is_navigable(point) {
            continue;
        }
        if player.is_some_and(|p| p.distance(point) < population.min_distance_from_player) {
            continue;
        }
        if world
            .agents()
            .any(|a| a.position().distance(point) < population.min_distance_between_agents)
        {
            continue;
        }
        return Ok(point);
    }
    Err(SpawnError::NoSpawnPoint {
        attempts: population.spawn_attempts,
    })
}

/// Spawn one agent with a weighted level, a valid position and random
/// initial hunger.
pub fn spawn_one(
    rng: &mut impl Rng,
    world: &mut World,
    config: &SimulationConfig,
) -> Result<AgentId, SpawnError> {
    let level = pick_level(rng, &config.population.level_weights)?;
    let position = find_spawn_point(rng, world, config)?;
    let hunger = initial_hunger(rng, &config.hunger);
    let seed = rng.random();
    Ok(world.spawn_agent(
        i64::from(level),
        position,
        hunger,
        seed,
        &config.hunger,
        &config.stamina,
    ))
}

/// Spawn the initial population. Agents that cannot be placed are skipped
/// with a warning. Returns how many were spawned.
pub fn spawn_initial(
    rng: &mut impl Rng,
    world: &mut World,
    config: &SimulationConfig,
) -> Result<u32, SpawnError> {
    let mut spawned = 0_u32;
    for _ in 0..config.population.initial_agents {
        match spawn_one(rng, world, config) {
            Ok(_) => spawned = spawned.saturating_add(1),
            Err(err @ SpawnError::NoSpawnPoint { .. }) => {
                tracing::warn!(error = %err, "Skipping initial agent");
            }
            Err(err) => return Err(err),
        }
    }
    tracing::info!(
        requested = config.population.initial_agents,
        spawned,
        "Initial population spawned"
    );
    Ok(spawned)
}

/// With probability `respawn_chance_per_sec * dt`, spawn one agent while
/// the population is below `max_agents`.
pub fn maybe_respawn(
    rng: &mut impl Rng,
    world: &mut World,
    config: &SimulationConfig,
    dt: f32,
) -> Option<AgentId> {
    let cap = usize::try_from(config.population.max_agents).unwrap_or(usize::MAX);
    if world.agent_count() >= cap {
        return None;
    }
    let chance = config.population.respawn_chance_per_sec * dt;
    if chance.is_nan() || chance <= 0.0 {
        return None;
    }
    if !rng.random_bool(f64::from(chance.min(1.0))) {
        return None;
    }
    match spawn_one(rng, world, config) {
        Ok(id) => {
            tracing::debug!(agent = %id, alive = world.agent_count(), "Agent respawned");
            Some(id)
        }
        Err(err) => {
            tracing::debug!(error = %err, "Respawn skipped");
            None
        }
    }
}

fn initial_hunger(rng: &mut impl Rng, config: &HungerConfig) -> f32 {
    let low = config.initial_min.min(config.initial_max);
    let high = config.initial_max.max(config.initial_min);
    if !low.is_finite() || !high.is_finite() || high <= low {
        return low;
    }
    rng.random_range(low..high)
}
