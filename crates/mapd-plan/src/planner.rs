//! Planner strategies.
//!
//! # Pluggability
//!
//! The stepper calls planning through the [`PathPlanner`] trait.  Both
//! built-in planners run the same search in [`crate::search`]; they differ
//! only in the conflict oracle they hand it.  [`VariantPlanner`] picks one
//! from a [`PlannerVariant`] so a configuration value can select the
//! strategy at run time.

use tracing::debug;

use mapd_core::{AgentId, PlannerVariant};
use mapd_fleet::{FleetStore, Plan};
use mapd_grid::RoadNetwork;

use crate::reservation::{ConflictOracle, NoReservations, ReservationTable, TickProgress};
use crate::search::{holding_plan, plan_path};
use crate::{PlanError, PlanResult};

// ── PlanningContext ───────────────────────────────────────────────────────────

/// Read-only view of the simulation a planner may consult.
pub struct PlanningContext<'a> {
    pub network:  &'a RoadNetwork,
    pub fleet:    &'a FleetStore,
    pub progress: &'a TickProgress,
}

// ── PathPlanner trait ─────────────────────────────────────────────────────────

/// Produces a plan from an agent's cell to its task's current sub-goal.
///
/// A returned plan either ends on the sub-goal or is a one-tick holding plan
/// (stay put or step aside) when no route exists right now.  The stepper
/// replans after a holding plan runs out.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so one planner can be shared by
/// batch runs on worker threads.
pub trait PathPlanner: Send + Sync {
    /// Plan for `agent`, which must hold a task.
    fn plan(&self, ctx: &PlanningContext<'_>, agent: AgentId) -> PlanResult<Plan>;

    /// Whether plans from this planner avoid other agents' commitments.
    fn avoids_conflicts(&self) -> bool;
}

/// Shared front half of every planner: find start and goal, run the search
/// against `oracle`, log the outcome.
fn plan_for<O: ConflictOracle + ?Sized>(
    ctx:    &PlanningContext<'_>,
    agent:  AgentId,
    oracle: &O,
) -> PlanResult<Plan> {
    let task = ctx.fleet.task_of(agent).ok_or(PlanError::NoTask(agent))?;
    let start = ctx.fleet.agent(agent).pos;
    let goal = task.sub_goal();

    match plan_path(ctx.network, start, goal, oracle)? {
        Some(plan) => {
            debug!(
                %agent,
                task = %task.id,
                %start,
                %goal,
                ticks = plan.len().saturating_sub(1),
                waits = plan.wait_count(),
                "planned"
            );
            Ok(plan)
        }
        None => {
            let plan = holding_plan(ctx.network, start, oracle);
            debug!(%agent, task = %task.id, %start, %goal, "no route; holding");
            Ok(plan)
        }
    }
}

// ── NaivePlanner ──────────────────────────────────────────────────────────────

/// Unconstrained shortest path.  Collisions are left to the stepper's
/// runtime check.
pub struct NaivePlanner;

impl PathPlanner for NaivePlanner {
    fn plan(&self, ctx: &PlanningContext<'_>, agent: AgentId) -> PlanResult<Plan> {
        plan_for(ctx, agent, &NoReservations)
    }

    fn avoids_conflicts(&self) -> bool {
        false
    }
}

// ── WaitBackoffPlanner ────────────────────────────────────────────────────────

/// Plans around every other agent's committed plan, waiting where needed.
pub struct WaitBackoffPlanner;

impl PathPlanner for WaitBackoffPlanner {
    fn plan(&self, ctx: &PlanningContext<'_>, agent: AgentId) -> PlanResult<Plan> {
        let table = ReservationTable::from_fleet(ctx.fleet, ctx.progress, agent);
        plan_for(ctx, agent, &table)
    }

    fn avoids_conflicts(&self) -> bool {
        true
    }
}

// ── VariantPlanner ────────────────────────────────────────────────────────────

/// A planner chosen by configuration.
///
/// The two wait-backoff variants share one planner; they differ in the
/// processing order the stepper applies, not in how a single plan is made.
pub enum VariantPlanner {
    Naive(NaivePlanner),
    WaitBackoff(WaitBackoffPlanner),
}

impl From<PlannerVariant> for VariantPlanner {
    fn from(variant: PlannerVariant) -> Self {
        match variant {
            PlannerVariant::Naive => VariantPlanner::Naive(NaivePlanner),
            PlannerVariant::WaitBackoffByTask | PlannerVariant::WaitBackoffByAgent => {
                VariantPlanner::WaitBackoff(WaitBackoffPlanner)
            }
        }
    }
}

impl PathPlanner for VariantPlanner {
    fn plan(&self, ctx: &PlanningContext<'_>, agent: AgentId) -> PlanResult<Plan> {
        match self {
            VariantPlanner::Naive(p) => p.plan(ctx, agent),
            VariantPlanner::WaitBackoff(p) => p.plan(ctx, agent),
        }
    }

    fn avoids_conflicts(&self) -> bool {
        match self {
            VariantPlanner::Naive(p) => p.avoids_conflicts(),
            VariantPlanner::WaitBackoff(p) => p.avoids_conflicts(),
        }
    }
}
