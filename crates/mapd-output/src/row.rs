//! Plain data row types written by output backends.

use mapd_core::Cell;

/// One agent at a snapshot tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentSnapshotRow {
    pub tick:     u64,
    pub agent_id: u32,
    pub pos:      Cell,
    /// The waypoint after the current one; `None` without a plan or at its end.
    pub next:     Option<Cell>,
    /// Serving task, if any.
    pub task_id:  Option<u32>,
    /// `idle`, `en-route-pickup`, `en-route-dropoff`, or `done`.
    pub phase:    &'static str,
}

/// One outstanding task at a snapshot tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSnapshotRow {
    pub tick:        u64,
    pub task_id:     u32,
    pub origin:      Cell,
    pub destination: Cell,
    /// `pending`, `en-route-to-pickup`, or `in-transit`.
    pub status:      &'static str,
    pub agent_id:    Option<u32>,
}

/// Counters for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:            u64,
    /// `tick * tick_duration_ms`: when an interactive driver shows this tick.
    pub elapsed_ms:      u64,
    pub moved:           u32,
    pub held:            u32,
    pub delivered_total: u32,
    pub cost_total:      u64,
}
