//! Bounded resource pools: the generic scalar plus the hunger and stamina
//! rules built on it.
//!
//! - [`ResourcePool`] -- a value clamped to `[0, max]`. Also used for health.
//! - [`HungerPool`] -- constant-rate decay, named status bands.
//! - [`StaminaPool`] -- drains while sprinting, regenerates after a delay,
//!   and keeps sprinting disabled from exhaustion until it is full again.
//!
//! Every mutation clamps, so the bounds hold after any sequence of calls.

use foodchain_types::HungerStatus;

use crate::config::{HungerConfig, StaminaConfig};

/// A scalar clamped to `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourcePool {
    value: f32,
    max: f32,
}

impl ResourcePool {
    /// Create a pool. `max` below zero is treated as zero; `value` is clamped.
    pub fn new(value: f32, max: f32) -> Self {
        let max = if max.is_finite() { max.max(0.0) } else { 0.0 };
        let mut pool = Self { value: 0.0, max };
        pool.set(value);
        pool
    }

    /// Create a pool that starts full.
    pub fn full(max: f32) -> Self {
        Self::new(max, max)
    }

    /// Current value.
    pub const fn value(&self) -> f32 {
        self.value
    }

    /// Upper bound.
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Replace the value, clamping to the bounds. Non-finite input empties
    /// the pool.
    pub fn set(&mut self, value: f32) {
        self.value = if value.is_finite() {
            value.clamp(0.0, self.max)
        } else {
            0.0
        };
    }

    /// Add `amount` (negative to subtract) and clamp. Returns the change
    /// actually applied.
    pub fn add(&mut self, amount: f32) -> f32 {
        let before = self.value;
        self.set(before + amount);
        self.value - before
    }

    /// Fraction of the maximum in `[0, 1]`; an empty-capacity pool reports 0.
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        self.value / self.max
    }

    /// Percentage of the maximum in `[0, 100]`.
    pub fn percent(&self) -> f32 {
        self.fraction() * 100.0
    }

    /// Whether the value has reached zero.
    pub fn is_empty(&self) -> bool {
        self.value <= 0.0
    }

    /// Whether the value has reached the maximum.
    pub fn is_full(&self) -> bool {
        self.value >= self.max
    }
}

/// Hunger: 100 is full, 0 is empty; decays at a constant rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HungerPool {
    pool: ResourcePool,
    decay_per_sec: f32,
}

impl HungerPool {
    /// Create a hunger pool at `initial` using the configured bounds and rate.
    pub fn new(initial: f32, config: &HungerConfig) -> Self {
        Self {
            pool: ResourcePool::new(initial, config.max),
            decay_per_sec: config.decay_per_sec.max(0.0),
        }
    }

    /// Apply `dt` seconds of decay.
    pub fn tick(&mut self, dt: f32) {
        self.pool.add(-self.decay_per_sec * dt.max(0.0));
    }

    /// Restore hunger (eating). Returns the amount actually restored.
    pub fn add(&mut self, amount: f32) -> f32 {
        self.pool.add(amount)
    }

    /// Current hunger value.
    pub const fn value(&self) -> f32 {
        self.pool.value()
    }

    /// Underlying bounded pool.
    pub const fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    /// Status band of the current value, as a percentage of the maximum.
    pub fn status(&self) -> HungerStatus {
        hunger_status(self.pool.percent())
    }
}

/// Map a hunger percentage to its status band.
///
/// Satiated above 75, Normal above 50, Hungry above 25, otherwise Starving.
pub fn hunger_status(percent: f32) -> HungerStatus {
    if percent > 75.0 {
        HungerStatus::Satiated
    } else if percent > 50.0 {
        HungerStatus::Normal
    } else if percent > 25.0 {
        HungerStatus::Hungry
    } else {
        HungerStatus::Starving
    }
}

/// Stamina with delayed regeneration and exhaustion hysteresis.
///
/// Once the pool is drained to zero the agent is exhausted; sprinting stays
/// disallowed until the pool is full again, not merely above zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaminaPool {
    pool: ResourcePool,
    drain_per_sec: f32,
    regen_per_sec: f32,
    recovery_delay_secs: f32,
    /// Seconds since stamina was last spent.
    since_active: f32,
    exhausted: bool,
}

impl StaminaPool {
    /// Create a full stamina pool from configuration.
    pub fn new(config: &StaminaConfig) -> Self {
        Self {
            pool: ResourcePool::full(config.max),
            drain_per_sec: config.drain_per_sec.max(0.0),
            regen_per_sec: config.regen_per_sec.max(0.0),
            recovery_delay_secs: config.recovery_delay_secs.max(0.0),
            since_active: 0.0,
            exhausted: false,
        }
    }

    /// Apply `dt` seconds. `sprinting` means the owner is running at sprint
    /// speed and actually moving faster than walking pace.
    pub fn tick(&mut self, dt: f32, sprinting: bool) {
        let dt = dt.max(0.0);
        if sprinting && !self.pool.is_empty() {
            self.pool.add(-self.drain_per_sec * dt);
            self.since_active = 0.0;
            if self.pool.is_empty() {
                self.exhausted = true;
            }
            return;
        }

        self.since_active += dt;
        if self.since_active >= self.recovery_delay_secs {
            self.pool.add(self.regen_per_sec * dt);
        }
        if self.exhausted && self.pool.is_full() {
            self.exhausted = false;
        }
    }

    /// Add or remove stamina directly. Draining to zero exhausts the pool.
    pub fn add(&mut self, amount: f32) -> f32 {
        let applied = self.pool.add(amount);
        if self.pool.is_empty() {
            self.exhausted = true;
        } else if self.exhausted && self.pool.is_full() {
            self.exhausted = false;
        }
        applied
    }

    /// Whether sprint speed is currently permitted.
    pub fn can_sprint(&self) -> bool {
        !self.exhausted && !self.pool.is_empty()
    }

    /// Whether the pool hit zero and has not yet refilled completely.
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Current stamina value.
    pub const fn value(&self) -> f32 {
        self.pool.value()
    }

    /// Underlying bounded pool.
    pub const fn pool(&self) -> &ResourcePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_clamps_both_ways() {
        let mut pool = ResourcePool::new(50.0, 100.0);
        assert!((pool.add(80.0) - 50.0).abs() < 1e-6);
        assert!(pool.is_full());
        pool.add(-500.0);
        assert!(pool.is_empty());
    }

    #[test]
    fn non_finite_input_empties_pool() {
        let mut pool = ResourcePool::full(100.0);
        pool.set(f32::NAN);
        assert!(pool.is_empty());
    }

    #[test]
    fn hunger_decays_at_constant_rate() {
        let mut hunger = HungerPool::new(80.0, &HungerConfig::default());
        for _ in 0..100 {
            hunger.tick(0.1);
        }
        // 10 seconds at 0.1/s
        assert!((hunger.value() - 79.0).abs() < 1e-3);
    }

    #[test]
    fn hunger_never_goes_negative() {
        let cfg = HungerConfig {
            decay_per_sec: 50.0,
            ..HungerConfig::default()
        };
        let mut hunger = HungerPool::new(10.0, &cfg);
        hunger.tick(1.0);
        assert!(hunger.value() >= 0.0);
        assert_eq!(hunger.status(), HungerStatus::Starving);
    }

    #[test]
    fn hunger_status_bands() {
        assert_eq!(hunger_status(100.0), HungerStatus::Satiated);
        assert_eq!(hunger_status(75.5), HungerStatus::Satiated);
        assert_eq!(hunger_status(75.0), HungerStatus::Normal);
        assert_eq!(hunger_status(50.0), HungerStatus::Hungry);
        assert_eq!(hunger_status(40.0), HungerStatus::Hungry);
        assert_eq!(hunger_status(25.0), HungerStatus::Starving);
        assert_eq!(hunger_status(0.0), HungerStatus::Starving);
    }

    #[test]
    fn stamina_drains_only_while_sprinting() {
        let mut stamina = StaminaPool::new(&StaminaConfig::default());
        stamina.tick(1.0, true);
        assert!((stamina.value() - 90.0).abs() < 1e-4);
        stamina.tick(0.5, false);
        // recovery delay not yet elapsed
        assert!((stamina.value() - 90.0).abs() < 1e-4);
    }

    #[test]
    fn stamina_regenerates_after_delay() {
        let mut stamina = StaminaPool::new(&StaminaConfig::default());
        stamina.tick(2.0, true);
        assert!((stamina.value() - 80.0).abs() < 1e-4);
        stamina.tick(1.0, false);
        stamina.tick(0.5, false);
        assert!((stamina.value() - 90.0).abs() < 1e-3);
    }

    #[test]
    fn exhaustion_hysteresis_holds_until_full() {
        let mut stamina = StaminaPool::new(&StaminaConfig::default());
        // Drain to zero: 100 stamina at 10/s.
        for _ in 0..110 {
            stamina.tick(0.1, true);
        }
        assert!(stamina.pool().is_empty());
        assert!(stamina.is_exhausted());
        assert!(!stamina.can_sprint());

        // Wait out the delay, then regenerate to 99%.
        stamina.tick(1.0, false);
        stamina.add(99.0 - stamina.value());
        assert!((stamina.pool().percent() - 99.0).abs() < 1e-3);
        assert!(!stamina.can_sprint());

        // The last percent re-enables sprinting.
        stamina.tick(0.1, false);
        assert!(stamina.pool().is_full());
        assert!(stamina.can_sprint());
    }

    #[test]
    fn partial_drain_without_exhaustion_keeps_sprint() {
        let mut stamina = StaminaPool::new(&StaminaConfig::default());
        stamina.tick(5.0, true);
        assert!(!stamina.is_exhausted());
        assert!(stamina.can_sprint());
    }
}
