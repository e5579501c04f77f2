//! Shared run control for the simulation loop.
//!
//! [`RunControl`] is wrapped in [`Arc`](std::sync::Arc) and shared between
//! the run loop and whatever drives it (the engine's shutdown signal
//! handler, a test, an embedding host). Every field is atomic or behind an
//! async mutex so the loop never blocks on the hot path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify};

/// Reason why the simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// A stop was requested from outside the loop.
    Stopped,
    /// No agents and no player remain.
    Extinction,
}

/// Shared control state for a running simulation.
#[derive(Debug)]
pub struct RunControl {
    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Wakes the run loop out of its pacing sleep on a stop request.
    stop_notify: Notify,

    /// Real-time pacing between ticks in milliseconds (0 = unpaced).
    tick_interval_ms: u64,

    /// Wall-clock instant the control was created.
    started_at: Instant,

    /// Maximum number of ticks (0 = unlimited).
    max_ticks: u64,

    /// Reason the simulation ended, if it has.
    end_reason: Mutex<Option<SimulationEndReason>>,
}

impl RunControl {
    /// Create run control with the given pacing and tick limit.
    pub fn new(tick_interval_ms: u64, max_ticks: u64) -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
            stop_notify: Notify::new(),
            tick_interval_ms,
            started_at: Instant::now(),
            max_ticks,
            end_reason: Mutex::new(None),
        }
    }

    /// Request a clean stop. Also cuts short a pacing sleep in progress.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.stop_notify.notify_one();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Pacing in milliseconds.
    pub const fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }

    /// Wait out the pacing interval, returning early if a stop is
    /// requested. With no pacing, just yield to the runtime.
    pub async fn pace(&self) {
        if self.tick_interval_ms == 0 {
            tokio::task::yield_now().await;
            return;
        }
        if self.is_stop_requested() {
            return;
        }
        tokio::select! {
            () = tokio::time::sleep(Duration::from_millis(self.tick_interval_ms)) => {}
            () = self.stop_notify.notified() => {}
        }
    }

    /// Maximum number of ticks (0 = unlimited).
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Returns `true` if `max_ticks > 0` and `current_tick >= max_ticks`.
    pub const fn tick_limit_reached(&self, current_tick: u64) -> bool {
        self.max_ticks > 0 && current_tick >= self.max_ticks
    }

    /// Wall-clock seconds since the control was created.
    pub fn elapsed_seconds(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }

    /// Record the reason the simulation ended.
    pub async fn set_end_reason(&self, reason: SimulationEndReason) {
        *self.end_reason.lock().await = Some(reason);
    }

    /// The reason the simulation ended, if it has.
    pub async fn end_reason(&self) -> Option<SimulationEndReason> {
        *self.end_reason.lock().await
    }
}
