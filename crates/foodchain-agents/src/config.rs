//! Tunable parameters for agent behavior, resource pools and corpses.
//!
//! Each struct bundles one concern so that callers (scheduler, tests) can
//! override individual values. All durations are in simulated seconds and
//! all rates are per simulated second. The host loads these from the
//! `behavior`, `hunger`, `stamina` and `corpse` sections of
//! `foodchain-config.yaml`; missing keys fall back to the defaults below.

use serde::Deserialize;

/// Timing, range and rate parameters of the agent state machine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Seconds an agent stays Idle before it starts wandering (default: 3).
    pub idle_timeout_secs: f32,

    /// Seconds an agent stays Alert without escalating (default: 3).
    pub alert_duration_secs: f32,

    /// Seconds of fallback eating when a kill left no corpse (default: 5).
    pub eating_duration_secs: f32,

    /// Radius around the spawn anchor for wander destinations (default: 10).
    pub wander_radius: f32,

    /// Remaining path distance treated as "arrived" (default: 0.5).
    pub arrival_distance: f32,

    /// How far ahead of the threat a flee destination is projected (default: 15).
    pub flee_distance: f32,

    /// Search radius when snapping a flee point onto navigable ground (default: 10).
    pub flee_sample_radius: f32,

    /// Multiple of vision range beyond which a chase or flight ends (default: 1.5).
    pub disengage_vision_factor: f32,

    /// Multiple of attack range within which a much weaker actor is
    /// attacked in passing (default: 1.5).
    pub opportunistic_attack_factor: f32,

    /// Multiple of attack range beyond which an attack breaks off into a
    /// chase (default: 1.2).
    pub attack_leash_factor: f32,

    /// Multiple of attack range within which an agent can keep eating a
    /// corpse (default: 1.2).
    pub corpse_reach_factor: f32,

    /// Hunger restored per second while consuming a corpse (default: 8).
    pub corpse_hunger_per_sec: f32,

    /// Hunger restored per second by the fallback eat (default: 5).
    pub fallback_hunger_per_sec: f32,

    /// One-off hunger bonus for finishing a corpse (default: 30).
    pub corpse_completion_bonus: f32,

    /// Seconds between stuck checks (default: 1).
    pub stuck_check_interval_secs: f32,

    /// Minimum displacement per check to count as progress (default: 0.1).
    pub stuck_min_progress: f32,

    /// Consecutive failed checks before the agent is declared stuck (default: 3).
    pub stuck_checks: u32,

    /// Radius of the fresh destination requested after getting stuck (default: 5).
    pub unstuck_radius: f32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 3.0,
            alert_duration_secs: 3.0,
            eating_duration_secs: 5.0,
            wander_radius: 10.0,
            arrival_distance: 0.5,
            flee_distance: 15.0,
            flee_sample_radius: 10.0,
            disengage_vision_factor: 1.5,
            opportunistic_attack_factor: 1.5,
            attack_leash_factor: 1.2,
            corpse_reach_factor: 1.2,
            corpse_hunger_per_sec: 8.0,
            fallback_hunger_per_sec: 5.0,
            corpse_completion_bonus: 30.0,
            stuck_check_interval_secs: 1.0,
            stuck_min_progress: 0.1,
            stuck_checks: 3,
            unstuck_radius: 5.0,
        }
    }
}

/// Parameters of the hunger pool.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HungerConfig {
    /// Upper bound of the pool (default: 100).
    pub max: f32,

    /// Hunger lost per second (default: 0.1).
    pub decay_per_sec: f32,

    /// Lower bound of the random starting hunger (default: 60).
    pub initial_min: f32,

    /// Upper bound (exclusive) of the random starting hunger (default: 100).
    pub initial_max: f32,
}

impl Default for HungerConfig {
    fn default() -> Self {
        Self {
            max: 100.0,
            decay_per_sec: 0.1,
            initial_min: 60.0,
            initial_max: 100.0,
        }
    }
}

/// Parameters of the stamina pool.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StaminaConfig {
    /// Upper bound of the pool (default: 100).
    pub max: f32,

    /// Stamina spent per second of sprinting (default: 10).
    pub drain_per_sec: f32,

    /// Stamina recovered per second once recovery has started (default: 20).
    pub regen_per_sec: f32,

    /// Seconds after the last sprint before recovery starts (default: 1).
    pub recovery_delay_secs: f32,
}

impl Default for StaminaConfig {
    fn default() -> Self {
        Self {
            max: 100.0,
            drain_per_sec: 10.0,
            regen_per_sec: 20.0,
            recovery_delay_secs: 1.0,
        }
    }
}

/// Parameters of corpse consumption and expiry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CorpseConfig {
    /// Seconds of uninterrupted consumption to finish a corpse (default: 5).
    pub consume_duration_secs: f32,

    /// Seconds between payouts to the active consumer (default: 0.5).
    pub payout_interval_secs: f32,

    /// Lifetime of an unconsumed corpse (default: 60).
    pub auto_expire_secs: f32,

    /// Trailing fraction of the lifetime spent blinking (default: 0.1).
    pub warning_fraction: f32,

    /// Seconds between visibility toggles while blinking (default: 0.2).
    pub blink_interval_secs: f32,
}

impl Default for CorpseConfig {
    fn default() -> Self {
        Self {
            consume_duration_secs: 5.0,
            payout_interval_secs: 0.5,
            auto_expire_secs: 60.0,
            warning_fraction: 0.1,
            blink_interval_secs: 0.2,
        }
    }
}

impl CorpseConfig {
    /// Age at which the warning (blinking) phase begins.
    pub fn warning_starts_at(&self) -> f32 {
        self.auto_expire_secs * (1.0 - self.warning_fraction.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_behavior_values() {
        let cfg = BehaviorConfig::default();
        assert!((cfg.alert_duration_secs - 3.0).abs() < f32::EPSILON);
        assert!((cfg.disengage_vision_factor - 1.5).abs() < f32::EPSILON);
        assert!((cfg.attack_leash_factor - 1.2).abs() < f32::EPSILON);
        assert_eq!(cfg.stuck_checks, 3);
    }

    #[test]
    fn warning_phase_is_last_tenth_of_lifetime() {
        let cfg = CorpseConfig::default();
        assert!((cfg.warning_starts_at() - 54.0).abs() < 1e-4);
    }

    #[test]
    fn partial_section_keeps_defaults() {
        let cfg: StaminaConfig = serde_json::from_str(r#"{ "max": 150.0 }"#).unwrap_or_default();
        assert!((cfg.max - 150.0).abs() < f32::EPSILON);
        assert!((cfg.regen_per_sec - 20.0).abs() < f32::EPSILON);
    }
}
