//! Nearest-first dispatch.
//!
//! Both directions run the same search: an unweighted BFS from the query
//! cell over road cells, stopping at the first cell (in discovery order) that
//! holds a pool member.  If several members share that cell the lowest id
//! wins.  Discovery order is fixed by the (+x, +y, −x, −y) neighbour order,
//! so the result is deterministic and its distance is minimal.

use tracing::debug;

use mapd_core::{AgentId, Cell, TaskId};
use mapd_grid::{Bfs, RoadNetwork};

use crate::{FleetError, FleetResult, FleetStore};

#[cfg(feature = "fx-hash")]
type CellIndex<T> = rustc_hash::FxHashMap<Cell, Vec<T>>;
#[cfg(not(feature = "fx-hash"))]
type CellIndex<T> = std::collections::HashMap<Cell, Vec<T>>;

/// Matches idle agents with pending tasks.
pub struct Dispatcher;

impl Dispatcher {
    /// Nearest free agent to `from` and its BFS distance.
    pub fn nearest_free_agent(
        network: &RoadNetwork,
        fleet:   &FleetStore,
        from:    Cell,
    ) -> FleetResult<(AgentId, u32)> {
        let pool = build_cell_index(fleet.free_agents().map(|a| (a.pos, a.id)));
        nearest(network, from, &pool, "free agents")
    }

    /// Nearest pending, unassigned task origin to `from` and its BFS distance.
    pub fn nearest_pending_task(
        network: &RoadNetwork,
        fleet:   &FleetStore,
        from:    Cell,
    ) -> FleetResult<(TaskId, u32)> {
        let pool = build_cell_index(fleet.pending_tasks().map(|t| (t.origin, t.id)));
        nearest(network, from, &pool, "pending tasks")
    }

    /// Give `task` to the free agent nearest its origin.
    pub fn assign_agent_to_task(
        network: &RoadNetwork,
        fleet:   &mut FleetStore,
        task:    TaskId,
    ) -> FleetResult<AgentId> {
        let origin = fleet.task(task).ok_or(FleetError::TaskNotFound(task))?.origin;
        let (agent, distance) = Self::nearest_free_agent(network, fleet, origin)?;
        fleet.assign(agent, task)?;
        debug!(%task, %agent, distance, "dispatched nearest agent to task");
        Ok(agent)
    }

    /// Give `agent` the pending task whose origin is nearest to it.
    pub fn assign_task_to_agent(
        network: &RoadNetwork,
        fleet:   &mut FleetStore,
        agent:   AgentId,
    ) -> FleetResult<TaskId> {
        let from = fleet.agent(agent).pos;
        let (task, distance) = Self::nearest_pending_task(network, fleet, from)?;
        fleet.assign(agent, task)?;
        debug!(%agent, %task, distance, "dispatched nearest task to agent");
        Ok(task)
    }
}

// ── Search helpers ────────────────────────────────────────────────────────────

/// Group pool members by cell, keeping their iteration order per cell.
/// Time complexity: O(pool size).
fn build_cell_index<T>(members: impl Iterator<Item = (Cell, T)>) -> CellIndex<T> {
    let mut index = CellIndex::<T>::default();
    for (cell, id) in members {
        index.entry(cell).or_default().push(id);
    }
    index
}

fn nearest<T: Copy>(
    network: &RoadNetwork,
    from:    Cell,
    pool:    &CellIndex<T>,
    what:    &'static str,
) -> FleetResult<(T, u32)> {
    if pool.is_empty() {
        return Err(FleetError::EmptyPool { from, pool: what });
    }
    Bfs::new(network, from)
        .find_map(|(cell, d)| pool.get(&cell).and_then(|ids| ids.first()).map(|&id| (id, d)))
        .ok_or(FleetError::Unreachable { from, pool: what })
}
