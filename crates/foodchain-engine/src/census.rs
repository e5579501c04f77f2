//! Tick callback that logs a periodic population census and keeps run
//! totals for the final report.

use std::collections::BTreeMap;

use foodchain_core::{SimulationState, TickCallback, TickSummary};
use foodchain_types::BehaviorState;
use serde::Serialize;
use tracing::{debug, info};

/// Counters accumulated over the whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunTotals {
    /// Kills made by agents.
    pub kills: u64,
    /// Agents killed by the player.
    pub player_kills: u64,
    /// Corpses eaten to completion.
    pub corpses_completed: u64,
    /// Corpses left to rot.
    pub corpses_expired: u64,
    /// Agents spawned after the initial population.
    pub respawned: u64,
    /// Agents removed after an unrecoverable fault.
    pub removed_faulty: u64,
    /// Largest number of agents alive at once.
    pub peak_population: usize,
    /// Ticks each behavior state was occupied, summed over agents.
    pub state_ticks: BTreeMap<BehaviorState, u64>,
}

/// Logs a census every `interval` ticks and accumulates [`RunTotals`].
pub struct CensusCallback {
    interval: u64,
    totals: RunTotals,
}

impl CensusCallback {
    /// Census every `interval` ticks; 0 disables the periodic log.
    pub fn new(interval: u64) -> Self {
        Self {
            interval,
            totals: RunTotals::default(),
        }
    }

    /// Totals so far.
    pub const fn totals(&self) -> &RunTotals {
        &self.totals
    }

    fn accumulate(&mut self, summary: &TickSummary) {
        let t = &mut self.totals;
        t.kills = t.kills.saturating_add(u64::from(summary.kills));
        t.player_kills = t
            .player_kills
            .saturating_add(u64::from(summary.player_kills));
        t.corpses_completed = t
            .corpses_completed
            .saturating_add(u64::from(summary.completed_corpses));
        t.corpses_expired = t
            .corpses_expired
            .saturating_add(u64::from(summary.expired_corpses));
        t.respawned = t.respawned.saturating_add(u64::from(summary.spawned));
        t.removed_faulty = t
            .removed_faulty
            .saturating_add(u64::from(summary.removed_faulty));
        t.peak_population = t.peak_population.max(summary.alive_agents);
        for (state, count) in &summary.states {
            let entry = t.state_ticks.entry(*state).or_insert(0);
            *entry = entry.saturating_add(u64::from(*count));
        }
    }
}

impl TickCallback for CensusCallback {
    fn on_tick(&mut self, summary: &TickSummary, sim: &SimulationState) {
        self.accumulate(summary);

        if summary.deaths > 0 {
            debug!(tick = summary.tick, deaths = summary.deaths, "Deaths this tick");
        }
        if self.interval == 0 || summary.tick.checked_rem(self.interval) != Some(0) {
            return;
        }
        info!(
            tick = summary.tick,
            sim_secs = summary.elapsed_secs,
            alive = summary.alive_agents,
            corpses = summary.corpses,
            total_deaths = summary.total_deaths,
            player_health = ?summary.player_health,
            player_currency = ?summary.player_currency,
            states = ?summary.states,
            levels = ?level_census(sim),
            "Census"
        );
    }
}

/// Number of live agents per level.
fn level_census(sim: &SimulationState) -> BTreeMap<u32, u32> {
    let mut levels = BTreeMap::new();
    for agent in sim.world.agents() {
        let count = levels.entry(agent.level()).or_insert(0_u32);
        *count = count.saturating_add(1);
    }
    levels
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use foodchain_core::SimulationConfig;

    use super::*;

    #[test]
    fn totals_accumulate_across_ticks() {
        let mut config = SimulationConfig::default();
        config.population.initial_agents = 3;
        config.population.respawn_chance_per_sec = 0.0;
        let mut sim = SimulationState::new(config).unwrap();
        sim.populate().unwrap();

        let mut callback = CensusCallback::new(2);
        let mut summary = TickSummary {
            tick: 1,
            kills: 1,
            player_kills: 1,
            completed_corpses: 1,
            spawned: 1,
            alive_agents: 3,
            ..TickSummary::default()
        };
        summary.states.insert(BehaviorState::Wandering, 3);
        callback.on_tick(&summary, &sim);
        summary.tick = 2;
        summary.alive_agents = 5;
        callback.on_tick(&summary, &sim);

        let totals = callback.totals();
        assert_eq!(totals.kills, 2);
        assert_eq!(totals.player_kills, 2);
        assert_eq!(totals.corpses_completed, 2);
        assert_eq!(totals.respawned, 2);
        assert_eq!(totals.peak_population, 5);
        assert_eq!(totals.state_ticks.get(&BehaviorState::Wandering), Some(&6));
    }

    #[test]
    fn level_census_counts_agents() {
        let mut config = SimulationConfig::default();
        config.population.initial_agents = 6;
        let mut sim = SimulationState::new(config).unwrap();
        let spawned = sim.populate().unwrap();
        assert_eq!(level_census(&sim).values().sum::<u32>(), spawned);
    }
}
