//! Simulation loop runner.
//!
//! [`run_simulation`] drives the tick cycle with:
//!
//! - **Bounded runs**: stop after `max_ticks`
//! - **Real-time pacing**: sleep `tick_interval_ms` between ticks
//! - **Clean stop**: a stop request cuts the pacing sleep short and ends
//!   the loop before the next tick
//! - **Extinction**: the loop ends when no agents and no player remain
//!
//! Pacing never changes simulated time: every tick advances the clock by
//! the same fixed step.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::control::{RunControl, SimulationEndReason};
use crate::tick::{self, SimulationState, TickError, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Result of the simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
    /// Wall-clock seconds the run took.
    pub wall_secs: f64,
}

/// Callback invoked after each tick completes.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState);
}

/// A no-op tick callback.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {}
}

/// Run the simulation loop until a termination condition is met.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick execution fails unrecoverably.
pub async fn run_simulation(
    state: &mut SimulationState,
    control: &Arc<RunControl>,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks = control.max_ticks(),
        tick_interval_ms = control.tick_interval_ms(),
        step_secs = state.clock.step_secs(),
        agents = state.world.agent_count(),
        "Simulation starting"
    );

    let end = |reason: SimulationEndReason, summary: Option<TickSummary>, ticks: u64| {
        SimulationResult {
            end_reason: reason,
            final_summary: summary,
            total_ticks: ticks,
            wall_secs: control.elapsed_seconds(),
        }
    };

    loop {
        // --- Check stop request (before tick) ---
        if control.is_stop_requested() {
            info!("Stop requested");
            control.set_end_reason(SimulationEndReason::Stopped).await;
            return Ok(end(SimulationEndReason::Stopped, last_summary, total_ticks));
        }

        // --- Execute tick ---
        let summary = tick::run_tick(state)?;
        total_ticks = total_ticks.saturating_add(1);

        // --- Notify callback ---
        callback.on_tick(&summary, state);

        // --- Check extinction ---
        if summary.is_extinct() {
            info!(tick = summary.tick, "No agents and no player left -- extinction");
            control.set_end_reason(SimulationEndReason::Extinction).await;
            return Ok(end(SimulationEndReason::Extinction, Some(summary), total_ticks));
        }

        // --- Check tick limit (after tick) ---
        if control.tick_limit_reached(summary.tick) {
            info!(tick = summary.tick, max_ticks = control.max_ticks(), "Tick limit reached");
            control.set_end_reason(SimulationEndReason::MaxTicksReached).await;
            return Ok(end(SimulationEndReason::MaxTicksReached, Some(summary), total_ticks));
        }

        last_summary = Some(summary);

        // --- Pace ---
        control.pace().await;
    }
}

/// Log the simulation end.
pub fn log_simulation_end(result: &SimulationResult) {
    let summary = result.final_summary.as_ref();
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        wall_secs = result.wall_secs,
        final_tick = summary.map(|s| s.tick),
        final_agents_alive = summary.map(|s| s.alive_agents),
        total_deaths = summary.map(|s| s.total_deaths),
        player_currency = summary.and_then(|s| s.player_currency),
        "Simulation ended"
    );
}
