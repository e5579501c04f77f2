//! Per-level combat statistics.
//!
//! Stats are derived from the agent's level once, at spawn, and never
//! recomputed. A [`StatTable`] holds the resolved values for every level
//! the host cares about; levels without an explicit entry fall back to
//! the formula in [`LevelStats::for_level`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Combat and movement numbers for one level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelStats {
    /// Walking speed in units per second.
    pub walk_speed: f32,
    /// Sprinting speed in units per second.
    pub run_speed: f32,
    /// Perception radius.
    pub vision_range: f32,
    /// Melee reach.
    pub attack_range: f32,
    /// Damage dealt per strike.
    pub attack_damage: f32,
    /// Seconds between strikes.
    pub attack_cooldown_secs: f32,
    /// Health cap.
    pub max_health: f32,
    /// Heal paid out by a fully eaten corpse of this level.
    pub corpse_heal: u32,
    /// Currency paid out by a fully eaten corpse of this level.
    pub corpse_currency: u32,
}

impl LevelStats {
    /// Derive stats for `level` from the growth formula. Level 0 is
    /// treated as level 1.
    pub fn for_level(level: u32) -> Self {
        let level = level.max(1);
        let steps = level.saturating_sub(1) as f32;
        let cooldown_steps = level.saturating_sub(2) as f32;
        Self {
            walk_speed: 0.2f32.mul_add(steps, 2.0),
            run_speed: 0.5f32.mul_add(steps, 5.0),
            vision_range: 10.0 + steps,
            attack_range: 0.1f32.mul_add(steps, 2.0),
            attack_damage: 5.0f32.mul_add(steps, 10.0),
            attack_cooldown_secs: (-0.1f32).mul_add(cooldown_steps, 1.0).max(0.5),
            max_health: 25.0f32.mul_add(steps, 50.0),
            corpse_heal: level.saturating_mul(10),
            corpse_currency: level.saturating_mul(5),
        }
    }
}

/// Immutable lookup from level to stats.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatTable {
    overrides: BTreeMap<u32, LevelStats>,
}

impl StatTable {
    /// A table that uses the growth formula for every level.
    pub fn formula() -> Self {
        Self::default()
    }

    /// A table with explicit entries for some levels.
    pub const fn with_overrides(overrides: BTreeMap<u32, LevelStats>) -> Self {
        Self { overrides }
    }

    /// Stats for `level`.
    pub fn get(&self, level: u32) -> LevelStats {
        self.overrides
            .get(&level)
            .copied()
            .unwrap_or_else(|| LevelStats::for_level(level))
    }
}

/// Clamp a requested spawn level into the valid range.
///
/// Returns the level to use and, when the request was invalid, the error
/// describing the correction so the caller can log it.
pub fn clamp_level(requested: i64) -> (u32, Option<AgentError>) {
    if requested >= 1 {
        let level = u32::try_from(requested).unwrap_or(u32::MAX);
        return (level, None);
    }
    (
        1,
        Some(AgentError::InvalidLevel {
            requested,
            clamped: 1,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn level_one_baseline() {
        let s = LevelStats::for_level(1);
        assert!(close(s.walk_speed, 2.0));
        assert!(close(s.run_speed, 5.0));
        assert!(close(s.vision_range, 10.0));
        assert!(close(s.attack_range, 2.0));
        assert!(close(s.attack_damage, 10.0));
        assert!(close(s.attack_cooldown_secs, 1.0));
        assert!(close(s.max_health, 50.0));
    }

    #[test]
    fn growth_per_level() {
        let s = LevelStats::for_level(3);
        assert!(close(s.walk_speed, 2.4));
        assert!(close(s.run_speed, 6.0));
        assert!(close(s.vision_range, 12.0));
        assert!(close(s.attack_range, 2.2));
        assert!(close(s.attack_damage, 20.0));
        assert!(close(s.attack_cooldown_secs, 0.9));
        assert!(close(s.max_health, 100.0));
    }

    #[test]
    fn cooldown_has_a_floor() {
        assert!(close(LevelStats::for_level(20).attack_cooldown_secs, 0.5));
    }

    #[test]
    fn level_two_corpse_budget() {
        let s = LevelStats::for_level(2);
        assert_eq!(s.corpse_heal, 20);
        assert_eq!(s.corpse_currency, 10);
    }

    #[test]
    fn overrides_take_precedence() {
        let mut custom = LevelStats::for_level(1);
        custom.attack_damage = 99.0;
        let table = StatTable::with_overrides(BTreeMap::from([(1, custom)]));
        assert!(close(table.get(1).attack_damage, 99.0));
        assert!(close(table.get(2).attack_damage, 15.0));
    }

    #[test]
    fn non_positive_levels_clamp_to_one() {
        let (level, err) = clamp_level(0);
        assert_eq!(level, 1);
        assert!(matches!(err, Some(AgentError::InvalidLevel { requested: 0, .. })));
        let (level, err) = clamp_level(-4);
        assert_eq!(level, 1);
        assert!(err.is_some());
        assert_eq!(clamp_level(4), (4, None));
    }
}
