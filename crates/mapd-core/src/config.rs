//! Run configuration.
//!
//! Loaded from JSON by the demo driver (with the `serde` feature) or built in
//! code, then handed to the simulation builder.  A configuration only changes
//! between runs, never during one.

use std::fmt;

use crate::{MapdError, MapdResult};

// ── Planner selection ─────────────────────────────────────────────────────────

/// Which path-planning family drives the fleet.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum PlannerVariant {
    /// Unconstrained shortest path; collisions resolved only at step time.
    Naive,
    /// Reservation-aware search, agents processed in ascending task id.
    #[default]
    WaitBackoffByTask,
    /// Reservation-aware search, agents processed in ascending agent id.
    WaitBackoffByAgent,
}

impl PlannerVariant {
    pub const ALL: [PlannerVariant; 3] = [
        PlannerVariant::Naive,
        PlannerVariant::WaitBackoffByTask,
        PlannerVariant::WaitBackoffByAgent,
    ];

    /// Does this variant consult other agents' committed plans?
    #[inline]
    pub fn avoids_conflicts(self) -> bool {
        !matches!(self, PlannerVariant::Naive)
    }

    /// The processing order this variant was designed around.
    pub fn default_priority(self) -> PriorityScheme {
        match self {
            PlannerVariant::Naive | PlannerVariant::WaitBackoffByTask => PriorityScheme::ByTaskId,
            PlannerVariant::WaitBackoffByAgent => PriorityScheme::ByAgentId,
        }
    }
}

impl fmt::Display for PlannerVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlannerVariant::Naive              => "naive",
            PlannerVariant::WaitBackoffByTask  => "wait-backoff-by-task",
            PlannerVariant::WaitBackoffByAgent => "wait-backoff-by-agent",
        };
        f.write_str(s)
    }
}

/// Order in which agents are dispatched, planned, and stepped within a tick.
/// Earlier agents' plans are the committed obstacles for later ones.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum PriorityScheme {
    ByTaskId,
    ByAgentId,
}

// ── RunConfig ─────────────────────────────────────────────────────────────────

/// Everything needed to build and run one simulation.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RunConfig {
    /// Side length of the square grid.  Odd, at least 5.
    pub grid_size: i32,

    /// Lane cells converted to obstacles before connectivity repair.
    pub obstacle_count: u32,

    pub agent_count: u32,

    /// The run ends once this many tasks have been delivered.
    pub required_deliveries: u32,

    /// Presentation only: pacing of an interactive driver.
    pub tick_duration_ms: u64,

    pub variant: PlannerVariant,

    /// Overrides the variant's own processing order when set.
    pub priority: Option<PriorityScheme>,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Hard stop for a run that fails to finish.  `None` derives a bound from
    /// the grid size and the deliveries each agent has to make.
    pub max_ticks: Option<u64>,

    /// Minimum Manhattan distance between a generated task's origin and
    /// destination.
    pub min_trip_distance: u32,

    /// Observers receive a fleet snapshot every N ticks.
    pub snapshot_interval_ticks: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            grid_size:               17,
            obstacle_count:          50,
            agent_count:             20,
            required_deliveries:     60,
            tick_duration_ms:        100,
            variant:                 PlannerVariant::default(),
            priority:                None,
            seed:                    0,
            max_ticks:               None,
            min_trip_distance:       5,
            snapshot_interval_ticks: 1,
        }
    }
}

impl RunConfig {
    /// Effective processing order.
    #[inline]
    pub fn priority(&self) -> PriorityScheme {
        self.priority.unwrap_or_else(|| self.variant.default_priority())
    }

    /// Intersections per grid row: cells with both coordinates odd.
    #[inline]
    fn intersections_per_row(&self) -> u32 {
        ((self.grid_size.max(1) - 1) / 2) as u32
    }

    /// Road cells with exactly one even coordinate, the only cells that may
    /// hold obstacles.
    pub fn lane_cell_count(&self) -> u32 {
        let h = self.intersections_per_row();
        2 * h * h.saturating_sub(1)
    }

    /// Road cells of the obstacle-free lattice.
    pub fn road_cell_count(&self) -> u32 {
        let h = self.intersections_per_row();
        h * h + self.lane_cell_count()
    }

    /// Tick bound used when `max_ticks` is not set: 40 grid widths for
    /// every round of deliveries the fleet has to make, plus one round.
    pub fn effective_max_ticks(&self) -> u64 {
        self.max_ticks.unwrap_or_else(|| {
            let agents = self.agent_count.max(1) as u64;
            let rounds = (self.required_deliveries as u64).div_ceil(agents) + 1;
            rounds * 40 * self.grid_size.max(1) as u64
        })
    }

    /// Reject configurations no run can satisfy.
    pub fn validate(&self) -> MapdResult<()> {
        if self.grid_size < 5 || self.grid_size % 2 == 0 {
            return Err(MapdError::Config(format!(
                "grid_size must be odd and at least 5, got {}",
                self.grid_size
            )));
        }
        if self.agent_count == 0 {
            return Err(MapdError::Config("agent_count must be at least 1".into()));
        }
        if self.required_deliveries == 0 {
            return Err(MapdError::Config("required_deliveries must be at least 1".into()));
        }
        if self.snapshot_interval_ticks == 0 {
            return Err(MapdError::Config("snapshot_interval_ticks must be at least 1".into()));
        }
        let lanes = self.lane_cell_count();
        if self.obstacle_count > lanes {
            return Err(MapdError::Config(format!(
                "{} obstacles requested but a {}x{} grid has only {} lane cells",
                self.obstacle_count, self.grid_size, self.grid_size, lanes
            )));
        }
        // Repair only ever reopens cells, so this is a lower bound on road cells.
        let guaranteed_open = self.road_cell_count() - self.obstacle_count;
        if self.agent_count > guaranteed_open {
            return Err(MapdError::Config(format!(
                "{} agents do not fit on {} guaranteed road cells",
                self.agent_count, guaranteed_open
            )));
        }
        Ok(())
    }
}
