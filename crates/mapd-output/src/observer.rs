//! `SimOutputObserver<W>` bridges `SimObserver` to an `OutputWriter`.

use tracing::warn;

use mapd_core::{RunConfig, Tick};
use mapd_fleet::{AgentPhase, FleetStore, TaskStatus};
use mapd_grid::RoadNetwork;
use mapd_sim::{RunSummary, SimObserver, TickStats};

use crate::row::{AgentSnapshotRow, TaskSnapshotRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes fleet snapshots and tick summaries to any
/// [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:           W,
    tick_duration_ms: u64,
    last_error:       Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`, using `config` for the
    /// presentation clock.
    pub fn new(writer: W, config: &RunConfig) -> Self {
        Self {
            writer,
            tick_duration_ms: config.tick_duration_ms,
            last_error:       None,
        }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                warn!(error = %e, "output write failed");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, stats: &TickStats) {
        let row = TickSummaryRow {
            tick:            tick.0,
            elapsed_ms:      tick.0 * self.tick_duration_ms,
            moved:           stats.moved,
            held:            stats.held,
            delivered_total: stats.delivered_total,
            cost_total:      stats.cost_total,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, _network: &RoadNetwork, fleet: &FleetStore) {
        let agents = agent_rows(tick, fleet);
        let result = self.writer.write_agent_snapshots(&agents);
        self.store_err(result);

        let tasks = task_rows(tick, fleet);
        if !tasks.is_empty() {
            let result = self.writer.write_task_snapshots(&tasks);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _summary: &RunSummary) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}

// ── Row builders ──────────────────────────────────────────────────────────────

/// One row per agent, ascending id.
pub fn agent_rows(tick: Tick, fleet: &FleetStore) -> Vec<AgentSnapshotRow> {
    fleet
        .agents
        .iter()
        .map(|a| AgentSnapshotRow {
            tick:     tick.0,
            agent_id: a.id.0,
            pos:      a.pos,
            next:     a.next_waypoint().map(|w| w.cell),
            task_id:  a.task.map(|t| t.0),
            phase:    phase_name(fleet.phase(a.id)),
        })
        .collect()
}

/// One row per outstanding task, ascending id.
pub fn task_rows(tick: Tick, fleet: &FleetStore) -> Vec<TaskSnapshotRow> {
    fleet
        .tasks()
        .map(|t| TaskSnapshotRow {
            tick:        tick.0,
            task_id:     t.id.0,
            origin:      t.origin,
            destination: t.destination,
            status:      status_name(t.status),
            agent_id:    t.agent.map(|a| a.0),
        })
        .collect()
}

fn phase_name(phase: AgentPhase) -> &'static str {
    match phase {
        AgentPhase::Idle           => "idle",
        AgentPhase::EnRoutePickup  => "en-route-pickup",
        AgentPhase::EnRouteDropoff => "en-route-dropoff",
        AgentPhase::Done           => "done",
    }
}

fn status_name(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending         => "pending",
        TaskStatus::EnRouteToPickup => "en-route-to-pickup",
        TaskStatus::InTransit       => "in-transit",
    }
}
