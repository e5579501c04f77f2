//! Fixed-step simulation clock.
//!
//! The clock is the single source of truth for simulated time. Every tick
//! advances it by exactly one step, independent of how fast ticks are
//! executed in real time, so results depend only on the seed and the
//! configuration.
//!
//! # Design Principles
//!
//! - The tick counter uses checked arithmetic (no silent overflow).
//! - Elapsed time is derived from the tick counter, never accumulated
//!   separately, so it cannot drift.

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// The step length is zero, negative or not a number.
    #[error("invalid tick step: {step_secs}")]
    InvalidStep {
        /// The rejected step length in seconds.
        step_secs: f32,
    },
}

/// Fixed-step clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimClock {
    /// Number of completed ticks.
    tick: u64,

    /// Simulated seconds per tick.
    step_secs: f32,
}

impl SimClock {
    /// Create a clock at tick 0.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidStep`] unless `step_secs` is a positive
    /// finite number.
    pub fn new(step_secs: f32) -> Result<Self, ClockError> {
        if !step_secs.is_finite() || step_secs <= 0.0 {
            return Err(ClockError::InvalidStep { step_secs });
        }
        Ok(Self { tick: 0, step_secs })
    }

    /// Advance the clock by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Return the current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds per tick.
    pub const fn step_secs(&self) -> f32 {
        self.step_secs
    }

    /// Simulated seconds since tick 0.
    pub fn elapsed_secs(&self) -> f64 {
        self.tick as f64 * f64::from(self.step_secs)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn clock_starts_at_tick_zero() {
        let clock = SimClock::new(0.1).unwrap();
        assert_eq!(clock.tick(), 0);
        assert!(clock.elapsed_secs().abs() < f64::EPSILON);
    }

    #[test]
    fn clock_advances() {
        let mut clock = SimClock::new(0.1).unwrap();
        assert_eq!(clock.advance().unwrap(), 1);
        assert_eq!(clock.advance().unwrap(), 2);
        assert_eq!(clock.tick(), 2);
    }

    #[test]
    fn elapsed_time_does_not_drift() {
        let mut clock = SimClock::new(0.1).unwrap();
        for _ in 0..10_000 {
            clock.advance().unwrap();
        }
        assert!((clock.elapsed_secs() - 1000.0).abs() < 1e-3);
    }

    #[test]
    fn invalid_steps_are_rejected() {
        assert!(matches!(SimClock::new(0.0), Err(ClockError::InvalidStep { .. })));
        assert!(SimClock::new(-0.1).is_err());
        assert!(SimClock::new(f32::NAN).is_err());
    }

    #[test]
    fn overflow_is_an_error() {
        let mut clock = SimClock::new(1.0).unwrap();
        clock.tick = u64::MAX;
        assert!(matches!(clock.advance(), Err(ClockError::TickOverflow)));
    }
}
