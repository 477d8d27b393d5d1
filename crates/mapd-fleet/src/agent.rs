//! Per-agent state.

use mapd_core::{AgentId, Cell, TaskId};

use crate::plan::{Plan, Waypoint};

/// Where an agent is in its pickup/delivery cycle.  Derived from the agent
/// and its task, never stored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentPhase {
    /// Active with no task; eligible for dispatch.
    Idle,
    EnRoutePickup,
    EnRouteDropoff,
    /// Retired: no further tasks will be released for it to serve.
    Done,
}

/// A single vehicle.
///
/// Between ticks the agent stands on `plan[cursor + 1]`.  A fresh plan has
/// cursor `-1` (the agent is on waypoint 0); each step advances the cursor by
/// one, and a held step takes it back.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Agent {
    pub id:     AgentId,
    pub pos:    Cell,
    pub task:   Option<TaskId>,
    pub plan:   Plan,
    pub cursor: isize,
    /// Cleared when the agent retires.
    pub active: bool,
}

impl Agent {
    pub fn new(id: AgentId, pos: Cell) -> Self {
        Self {
            id,
            pos,
            task:   None,
            plan:   Plan::default(),
            cursor: -1,
            active: true,
        }
    }

    /// Active and without a task.
    #[inline]
    pub fn is_free(&self) -> bool {
        self.active && self.task.is_none()
    }

    /// Index of the waypoint the agent currently stands on.
    #[inline]
    pub fn current_index(&self) -> usize {
        (self.cursor + 1).max(0) as usize
    }

    /// The waypoint the agent will occupy after its next step, if any.
    pub fn next_waypoint(&self) -> Option<&Waypoint> {
        self.plan.get(self.current_index() + 1)
    }

    /// `true` once the agent stands on the last waypoint of a non-empty plan.
    pub fn at_plan_end(&self) -> bool {
        !self.plan.is_empty() && self.cursor + 1 >= self.plan.len() as isize - 1
    }

    /// Drop the plan; the next step replans from the current cell.
    pub fn clear_plan(&mut self) {
        self.plan.waypoints.clear();
        self.cursor = -1;
    }
}
