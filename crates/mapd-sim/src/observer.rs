//! Simulation observer trait for progress reporting and data collection.

use mapd_core::{AgentId, TaskId, Tick};
use mapd_fleet::FleetStore;
use mapd_grid::RoadNetwork;

/// Counters for one processed tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Agents whose cell changed this tick.
    pub moved:           u32,
    /// Steps refused by the runtime check, push-backs included.
    pub held:            u32,
    pub delivered_total: u32,
    pub cost_total:      u64,
}

/// Outcome of a finished run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub elapsed_ticks: u64,
    /// One unit per active agent per tick while it holds a task.
    pub total_cost:    u64,
    pub delivered:     u32,
    pub holds:         u64,
    pub replans:       u64,
}

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: delivery counter
///
/// ```rust,ignore
/// struct Deliveries(u32);
///
/// impl SimObserver for Deliveries {
///     fn on_delivery(&mut self, _tick: Tick, _task: TaskId, _agent: AgentId) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called whenever an agent's step is refused, including agents pushed
    /// back by a cascade.
    fn on_agent_held(&mut self, _tick: Tick, _agent: AgentId) {}

    /// Called when `agent` drops off `task`.
    fn on_delivery(&mut self, _tick: Tick, _task: TaskId, _agent: AgentId) {}

    /// Called at the end of each tick, after arrivals.
    fn on_tick_end(&mut self, _tick: Tick, _stats: &TickStats) {}

    /// Called every `config.snapshot_interval_ticks` ticks, and on the final
    /// tick.
    ///
    /// Provides read-only access to the grid and the fleet so that output
    /// writers and renderers can record positions, next waypoints, and task
    /// state without the sim knowing about any specific format.
    fn on_snapshot(&mut self, _tick: Tick, _network: &RoadNetwork, _fleet: &FleetStore) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _summary: &RunSummary) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
