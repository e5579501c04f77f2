//! Detection of agents that are trying to move but not getting anywhere.

use foodchain_types::Vec2;

use crate::config::BehaviorConfig;
use crate::ports::MovementPort;

/// Samples displacement at a fixed interval and counts consecutive
/// samples without progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StuckTracker {
    since_check: f32,
    last_position: Vec2,
    strikes: u32,
}

impl StuckTracker {
    /// Start tracking from `position`.
    pub const fn new(position: Vec2) -> Self {
        Self {
            since_check: 0.0,
            last_position: position,
            strikes: 0,
        }
    }

    /// Consecutive checks without progress so far.
    pub const fn strikes(&self) -> u32 {
        self.strikes
    }

    /// Feed `dt` seconds of movement.
    ///
    /// Returns the strike count when the body is declared stuck: either it
    /// left the navigable surface, or it has had an active path and moved
    /// less than the minimum for the configured number of checks in a row.
    /// The counter resets after a declaration.
    pub fn observe(&mut self, dt: f32, body: &impl MovementPort, config: &BehaviorConfig) -> Option<u32> {
        self.since_check += dt;
        if self.since_check < config.stuck_check_interval_secs {
            return None;
        }
        self.since_check = 0.0;

        let position = body.position();
        let moved = position.distance(self.last_position);
        self.last_position = position;

        let off_surface = !body.is_on_navigable_surface();
        let trying = body.has_path() && !body.is_stopped();
        if !off_surface && !(trying && moved < config.stuck_min_progress) {
            self.strikes = 0;
            return None;
        }

        self.strikes = self.strikes.saturating_add(1);
        if off_surface || self.strikes >= config.stuck_checks {
            let strikes = self.strikes;
            self.strikes = 0;
            return Some(strikes);
        }
        None
    }
}
