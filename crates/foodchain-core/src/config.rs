//! Configuration loading and typed config structures for the Foodchain simulation.
//!
//! The canonical configuration lives in `foodchain-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure, and provides a loader that reads and validates the file.
//! Every key is optional; a missing file or section means defaults.

use std::collections::BTreeMap;
use std::path::Path;

use foodchain_agents::{BehaviorConfig, CorpseConfig, HungerConfig, LevelStats, StaminaConfig};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an unusable simulation.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `foodchain-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World bounds, seed and timing.
    #[serde(default)]
    pub world: WorldConfig,

    /// Spawning and population limits.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Agent state machine tuning.
    #[serde(default)]
    pub behavior: BehaviorConfig,

    /// Hunger pool parameters.
    #[serde(default)]
    pub hunger: HungerConfig,

    /// Stamina pool parameters.
    #[serde(default)]
    pub stamina: StaminaConfig,

    /// Corpse consumption and expiry.
    #[serde(default)]
    pub corpse: CorpseConfig,

    /// The player entity.
    #[serde(default)]
    pub player: PlayerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load and validate configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the simulation cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| {
            Err(ConfigError::Invalid {
                reason: reason.to_owned(),
            })
        };
        if !self.world.tick_secs.is_finite() || self.world.tick_secs <= 0.0 {
            return invalid("world.tick_secs must be a positive number");
        }
        if !self.world.half_extent.is_finite() || self.world.half_extent <= 0.0 {
            return invalid("world.half_extent must be a positive number");
        }
        if self.population.level_weights.values().all(|w| *w == 0) {
            return invalid("population.level_weights must contain a positive weight");
        }
        if self.population.level_weights.contains_key(&0) {
            return invalid("population.level_weights keys are levels and start at 1");
        }
        if self.population.max_agents < self.population.initial_agents {
            return invalid("population.max_agents must be at least population.initial_agents");
        }
        let consume = self.corpse.consume_duration_secs;
        if !consume.is_finite() || consume <= 0.0 {
            return invalid("corpse.consume_duration_secs must be positive");
        }
        if let Some(name) = self
            .non_negative_fields()
            .into_iter()
            .find_map(|(name, value)| (!value.is_finite() || value < 0.0).then_some(name))
        {
            return Err(ConfigError::Invalid {
                reason: format!("{name} must be a finite, non-negative number"),
            });
        }
        if self.world.obstacle_min_radius > self.world.obstacle_max_radius {
            return invalid("world.obstacle_min_radius must not exceed world.obstacle_max_radius");
        }
        Ok(())
    }

    /// Distances, durations and rates that feed random sampling or timers.
    fn non_negative_fields(&self) -> [(&'static str, f32); 30] {
        let (w, p, b, h, s, c, pl) = (
            &self.world,
            &self.population,
            &self.behavior,
            &self.hunger,
            &self.stamina,
            &self.corpse,
            &self.player,
        );
        [
            ("world.obstacle_min_radius", w.obstacle_min_radius),
            ("world.obstacle_max_radius", w.obstacle_max_radius),
            ("population.respawn_chance_per_sec", p.respawn_chance_per_sec),
            ("population.min_distance_from_player", p.min_distance_from_player),
            ("population.min_distance_between_agents", p.min_distance_between_agents),
            ("behavior.idle_timeout_secs", b.idle_timeout_secs),
            ("behavior.alert_duration_secs", b.alert_duration_secs),
            ("behavior.eating_duration_secs", b.eating_duration_secs),
            ("behavior.wander_radius", b.wander_radius),
            ("behavior.arrival_distance", b.arrival_distance),
            ("behavior.flee_distance", b.flee_distance),
            ("behavior.flee_sample_radius", b.flee_sample_radius),
            ("behavior.stuck_check_interval_secs", b.stuck_check_interval_secs),
            ("behavior.unstuck_radius", b.unstuck_radius),
            ("hunger.max", h.max),
            ("hunger.decay_per_sec", h.decay_per_sec),
            ("hunger.initial_min", h.initial_min),
            ("hunger.initial_max", h.initial_max),
            ("stamina.max", s.max),
            ("stamina.drain_per_sec", s.drain_per_sec),
            ("stamina.regen_per_sec", s.regen_per_sec),
            ("stamina.recovery_delay_secs", s.recovery_delay_secs),
            ("corpse.payout_interval_secs", c.payout_interval_secs),
            ("corpse.auto_expire_secs", c.auto_expire_secs),
            ("corpse.blink_interval_secs", c.blink_interval_secs),
            ("player.max_health", pl.max_health),
            ("player.consume_range", pl.consume_range),
            ("player.attack_range", pl.attack_range),
            ("player.attack_damage", pl.attack_damage),
            ("player.attack_cooldown_secs", pl.attack_cooldown_secs),
        ]
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Simulated seconds per tick.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: f32,

    /// Real-time milliseconds between ticks (0 = as fast as possible).
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Stop after this many ticks (0 = unlimited).
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// The world spans `[-half_extent, half_extent]` on both axes.
    #[serde(default = "default_half_extent")]
    pub half_extent: f32,

    /// Number of circular obstacles scattered in the world.
    #[serde(default = "default_obstacle_count")]
    pub obstacle_count: u32,

    /// Smallest obstacle radius.
    #[serde(default = "default_obstacle_min_radius")]
    pub obstacle_min_radius: f32,

    /// Largest obstacle radius.
    #[serde(default = "default_obstacle_max_radius")]
    pub obstacle_max_radius: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            tick_secs: default_tick_secs(),
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: default_max_ticks(),
            half_extent: default_half_extent(),
            obstacle_count: default_obstacle_count(),
            obstacle_min_radius: default_obstacle_min_radius(),
            obstacle_max_radius: default_obstacle_max_radius(),
        }
    }
}

/// Population configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PopulationConfig {
    /// Number of agents to spawn at simulation start.
    #[serde(default = "default_initial_agents")]
    pub initial_agents: u32,

    /// Respawning stops while this many agents are alive.
    #[serde(default = "default_max_agents")]
    pub max_agents: u32,

    /// Relative spawn weight per level.
    #[serde(default = "default_level_weights")]
    pub level_weights: BTreeMap<u32, u32>,

    /// Probability per simulated second of a respawn while below `max_agents`.
    #[serde(default = "default_respawn_chance_per_sec")]
    pub respawn_chance_per_sec: f32,

    /// Agents never spawn closer than this to the player.
    #[serde(default = "default_min_distance_from_player")]
    pub min_distance_from_player: f32,

    /// Agents never spawn closer than this to each other.
    #[serde(default = "default_min_distance_between_agents")]
    pub min_distance_between_agents: f32,

    /// Placement attempts per agent before giving up.
    #[serde(default = "default_spawn_attempts")]
    pub spawn_attempts: u32,

    /// Explicit stats for some levels; other levels use the growth formula.
    #[serde(default)]
    pub stat_overrides: BTreeMap<u32, LevelStats>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_agents: default_initial_agents(),
            max_agents: default_max_agents(),
            level_weights: default_level_weights(),
            respawn_chance_per_sec: default_respawn_chance_per_sec(),
            min_distance_from_player: default_min_distance_from_player(),
            min_distance_between_agents: default_min_distance_between_agents(),
            spawn_attempts: default_spawn_attempts(),
            stat_overrides: BTreeMap::new(),
        }
    }
}

/// Player configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlayerConfig {
    /// Whether a player takes part in the simulation.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// The player's level, as agents perceive it.
    #[serde(default = "default_player_level")]
    pub level: u32,

    /// Health cap; the player starts full.
    #[serde(default = "default_player_max_health")]
    pub max_health: f32,

    /// Fraction of max health lost each second (rounded up).
    #[serde(default = "default_player_health_decay")]
    pub health_decay_fraction_per_sec: f32,

    /// How close a corpse must be for hold-to-consume.
    #[serde(default = "default_player_consume_range")]
    pub consume_range: f32,

    /// Radius around the player hit by an attack.
    #[serde(default = "default_player_attack_range")]
    pub attack_range: f32,

    /// Damage dealt to every agent in range.
    #[serde(default = "default_player_attack_damage")]
    pub attack_damage: f32,

    /// Seconds before the player can attack again.
    #[serde(default = "default_player_attack_cooldown_secs")]
    pub attack_cooldown_secs: f32,

    /// Starting x coordinate.
    #[serde(default)]
    pub start_x: f32,

    /// Starting z coordinate.
    #[serde(default)]
    pub start_z: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_player_level(),
            max_health: default_player_max_health(),
            health_decay_fraction_per_sec: default_player_health_decay(),
            consume_range: default_player_consume_range(),
            attack_range: default_player_attack_range(),
            attack_damage: default_player_attack_damage(),
            attack_cooldown_secs: default_player_attack_cooldown_secs(),
            start_x: 0.0,
            start_z: 0.0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,

    /// Log a population census every N ticks (0 = never).
    #[serde(default = "default_census_interval_ticks")]
    pub census_interval_ticks: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            census_interval_ticks: default_census_interval_ticks(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

const fn default_tick_secs() -> f32 {
    0.1
}

const fn default_tick_interval_ms() -> u64 {
    100
}

const fn default_max_ticks() -> u64 {
    6000
}

const fn default_half_extent() -> f32 {
    50.0
}

const fn default_obstacle_count() -> u32 {
    12
}

const fn default_obstacle_min_radius() -> f32 {
    1.0
}

const fn default_obstacle_max_radius() -> f32 {
    3.0
}

const fn default_initial_agents() -> u32 {
    15
}

const fn default_max_agents() -> u32 {
    25
}

fn default_level_weights() -> BTreeMap<u32, u32> {
    BTreeMap::from([(1, 40), (2, 30), (3, 18), (4, 9), (5, 3)])
}

const fn default_respawn_chance_per_sec() -> f32 {
    0.05
}

const fn default_min_distance_from_player() -> f32 {
    15.0
}

const fn default_min_distance_between_agents() -> f32 {
    5.0
}

const fn default_spawn_attempts() -> u32 {
    30
}

const fn default_true() -> bool {
    true
}

const fn default_player_level() -> u32 {
    1
}

const fn default_player_max_health() -> f32 {
    100.0
}

const fn default_player_health_decay() -> f32 {
    0.02
}

const fn default_player_consume_range() -> f32 {
    2.5
}

const fn default_player_attack_range() -> f32 {
    1.5
}

const fn default_player_attack_damage() -> f32 {
    20.0
}

const fn default_player_attack_cooldown_secs() -> f32 {
    0.5
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_census_interval_ticks() -> u64 {
    50
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
world:
  seed: 123
  tick_secs: 0.2
  tick_interval_ms: 0
  max_ticks: 500
  half_extent: 30.0
  obstacle_count: 4

population:
  initial_agents: 5
  max_agents: 8
  level_weights:
    1: 1
    3: 2
  respawn_chance_per_sec: 0.1

behavior:
  alert_duration_secs: 2.0
  stuck_checks: 4

stamina:
  drain_per_sec: 15.0

corpse:
  consume_duration_secs: 4.0

player:
  enabled: false
  level: 2

logging:
  level: debug
  json: true
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.world.seed, 123);
        assert_eq!(config.world.max_ticks, 500);
        assert_eq!(config.population.initial_agents, 5);
        assert_eq!(config.population.level_weights.get(&3), Some(&2));
        assert_eq!(config.behavior.stuck_checks, 4);
        assert!((config.behavior.alert_duration_secs - 2.0).abs() < f32::EPSILON);
        // Untouched keys in a touched section keep their defaults.
        assert!((config.behavior.idle_timeout_secs - 3.0).abs() < f32::EPSILON);
        assert!((config.stamina.regen_per_sec - 20.0).abs() < f32::EPSILON);
        assert!(!config.player.enabled);
        assert!(config.logging.json);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("world:\n  seed: 7\n").unwrap();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.population.initial_agents, 15);
        assert!((config.corpse.auto_expire_secs - 60.0).abs() < f32::EPSILON);
    }

    #[test]
    fn parse_empty_yaml() {
        assert_eq!(SimulationConfig::parse("").unwrap(), SimulationConfig::default());
    }

    #[test]
    fn defaults_are_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_tick() {
        let err = SimulationConfig::parse("world:\n  tick_secs: 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn rejects_empty_weights() {
        let mut config = SimulationConfig::default();
        config.population.level_weights.clear();
        assert!(config.validate().is_err());
        config.population.level_weights.insert(2, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_cap_below_initial_population() {
        let mut config = SimulationConfig::default();
        config.population.max_agents = 3;
        config.population.initial_agents = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_infinite_radii() {
        for yaml in [
            "behavior:\n  wander_radius: .inf\n",
            "behavior:\n  unstuck_radius: .inf\n",
            "world:\n  obstacle_max_radius: .inf\n",
            "player:\n  attack_range: .nan\n",
        ] {
            let err = SimulationConfig::parse(yaml).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { .. }), "{yaml}");
        }
    }

    #[test]
    fn rejects_negative_durations_and_swapped_obstacle_radii() {
        let mut config = SimulationConfig::default();
        config.behavior.alert_duration_secs = -1.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("behavior.alert_duration_secs"));

        let mut config = SimulationConfig::default();
        config.world.obstacle_min_radius = 4.0;
        config.world.obstacle_max_radius = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_yaml_is_a_yaml_error() {
        let err = SimulationConfig::parse("world: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("foodchain-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
