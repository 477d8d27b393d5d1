//! Time-expanded BFS with wait back-off.
//!
//! # Nodes
//!
//! Search nodes live in an arena (`Vec<Node>`) and point at their parent by
//! index.  A node is a `(cell, tick, arrival direction)` triple; its parent is
//! always exactly one tick earlier, so a node's tick is also its depth and
//! the rebuilt path needs no renumbering.  Each cell is entered by a move at
//! most once per attempt, from the first ring node (in discovery order) that
//! reached it.
//!
//! # Waiting
//!
//! When some move out of node `n` is blocked, `n` tries to wait one tick in
//! place so the blocked cell can be retried from the next ring.  If waiting
//! at `n` is itself unsafe, the wait is pushed back to an earlier node on
//! `n`'s parent chain: the agent waits there instead, and every later node of
//! the chain is replayed one tick later (each replayed occupation re-checked).
//! The start cell gets no special treatment; a wait there is checked like any
//! other.  At most one wait node per cell is added to a ring.
//!
//! Parked cells are never entered and never waited for.
//!
//! # Termination
//!
//! An attempt whose frontier empties has dead-ended; it is retried with the
//! departure delayed by one more tick, as long as standing on the start cell
//! that long is itself safe.  Past the oracle's horizon nothing blocks a move
//! except a parked cell, so no wait is added there and every attempt ends.
//! When no attempt reaches the goal the search reports `None` and the caller
//! falls back to [`holding_plan`].

use std::collections::VecDeque;

use tracing::trace;

use mapd_core::{Cell, Direction};
use mapd_fleet::{Plan, Waypoint};
use mapd_grid::RoadNetwork;

use crate::reservation::ConflictOracle;
use crate::{PlanError, PlanResult};

#[derive(Copy, Clone, Debug)]
struct Node {
    cell:     Cell,
    tick:     u32,
    dir:      Direction,
    parent:   Option<usize>,
}

/// How a move into a cell at a given tick fares.
enum Entry {
    Open,
    /// Reserved at this tick; waiting might clear it.
    Later,
    /// Parked; waiting will not help.
    Never,
}

/// Plan a conflict-free path from `start` to `goal` against `oracle`.
///
/// Waypoint `i` of the result is the cell occupied `i` ticks from now.
/// Arriving at the goal also requires the goal to be free for the tick
/// after arrival, when the agent stands there to pick up or drop off.
///
/// `Ok(None)` means no conflict-free path exists right now: the goal is
/// parked or cut off by parked cells, or every departure delay dead-ends.
pub fn plan_path<O: ConflictOracle + ?Sized>(
    network: &RoadNetwork,
    start:   Cell,
    goal:    Cell,
    oracle:  &O,
) -> PlanResult<Option<Plan>> {
    for cell in [start, goal] {
        if !network.is_open(cell) {
            return Err(PlanError::ClosedCell(cell));
        }
    }
    if start == goal {
        return Ok(Some(Plan::new(vec![Waypoint::new(start, 0, Direction::STILL)])));
    }
    if oracle.is_parked(goal) || !reachable(network, start, goal, oracle) {
        trace!(%start, %goal, "goal parked or cut off");
        return Ok(None);
    }

    let bound = tick_bound(network, oracle);
    let mut search = Search::new(network, goal, oracle, bound);
    for delay in 0..=oracle.horizon() + 1 {
        if delay > 0 && oracle.conflicts(start, delay, Direction::STILL) {
            break;
        }
        if let Some(plan) = search.attempt(start, delay)? {
            return Ok(Some(plan));
        }
        trace!(%start, %goal, delay, "search dead-ended; delaying departure");
    }
    Ok(None)
}

/// One-tick plan for an agent with no route: stay on `start` if that is
/// safe, otherwise step onto the first free neighbour.
///
/// Options are tried as `STILL`, then [`Direction::NEIGHBOR_ORDER`].  An
/// option free at offset 1 and still free at offset 2 wins; failing that,
/// the first option free at offset 1; failing that, the agent stays.
pub fn holding_plan<O: ConflictOracle + ?Sized>(
    network: &RoadNetwork,
    start:   Cell,
    oracle:  &O,
) -> Plan {
    let options: Vec<(Cell, Direction)> = std::iter::once(Direction::STILL)
        .chain(Direction::NEIGHBOR_ORDER)
        .map(|dir| (start.step(dir), dir))
        .filter(|&(cell, _)| network.is_open(cell))
        .collect();

    let free_now = |&&(cell, dir): &&(Cell, Direction)| !oracle.conflicts(cell, 1, dir);
    let (cell, dir) = options
        .iter()
        .filter(free_now)
        .find(|&&(cell, _)| !oracle.conflicts(cell, 2, Direction::STILL))
        .or_else(|| options.iter().find(free_now))
        .copied()
        .unwrap_or((start, Direction::STILL));

    Plan::new(vec![
        Waypoint::new(start, 0, Direction::STILL),
        Waypoint::new(cell, 1, dir),
    ])
}

/// Plain BFS from `start` to `goal` around parked cells.
fn reachable<O: ConflictOracle + ?Sized>(network: &RoadNetwork, start: Cell, goal: Cell, oracle: &O) -> bool {
    let mut seen = vec![false; network.cell_count()];
    let mut queue = VecDeque::new();
    if let Some(i) = network.index(start) {
        seen[i] = true;
        queue.push_back(start);
    }
    while let Some(cell) = queue.pop_front() {
        if cell == goal {
            return true;
        }
        for next in network.open_neighbors(cell) {
            let Some(i) = network.index(next) else { continue };
            if seen[i] || oracle.is_parked(next) {
                continue;
            }
            seen[i] = true;
            queue.push_back(next);
        }
    }
    false
}

/// Reservations end at the horizon; after that a plain BFS needs at most one
/// tick per road cell.
fn tick_bound<O: ConflictOracle + ?Sized>(network: &RoadNetwork, oracle: &O) -> u32 {
    oracle.horizon() + 2 + 4 * network.open_count() as u32
}

// ── Search state ──────────────────────────────────────────────────────────────

struct Search<'a, O: ?Sized> {
    network: &'a RoadNetwork,
    goal:    Cell,
    oracle:  &'a O,
    bound:   u32,
    arena:   Vec<Node>,
    /// Cells already entered by a move, row-major.
    visited: Vec<bool>,
    /// Tick of the last wait node added per cell, row-major.
    waiting: Vec<u32>,
}

impl<'a, O: ConflictOracle + ?Sized> Search<'a, O> {
    fn new(network: &'a RoadNetwork, goal: Cell, oracle: &'a O, bound: u32) -> Self {
        Self {
            network,
            goal,
            oracle,
            bound,
            arena:   Vec::new(),
            visited: vec![false; network.cell_count()],
            waiting: vec![0; network.cell_count()],
        }
    }

    /// One search that stays on `start` for `delay` ticks before expanding.
    /// `Ok(None)` means the frontier emptied.
    fn attempt(&mut self, start: Cell, delay: u32) -> PlanResult<Option<Plan>> {
        self.arena.clear();
        self.visited.fill(false);
        self.waiting.fill(0);

        let mut last = self.push(Node { cell: start, tick: 0, dir: Direction::STILL, parent: None });
        for tick in 1..=delay {
            last = self.push(Node { cell: start, tick, dir: Direction::STILL, parent: Some(last) });
        }
        if let Some(i) = self.network.index(start) {
            self.visited[i] = true;
        }

        let mut frontier = vec![last];
        let mut tick = delay;
        while !frontier.is_empty() {
            if tick >= self.bound {
                return Err(PlanError::TickBoundExceeded { start, goal: self.goal, bound: self.bound });
            }
            tick += 1;

            let mut ring = Vec::with_capacity(frontier.len() * 2);
            for &n in &frontier {
                let node = self.arena[n];
                let mut blocked = false;

                for dir in Direction::NEIGHBOR_ORDER {
                    let cell = node.cell.step(dir);
                    let Some(i) = self.network.index(cell) else { continue };
                    if self.visited[i] || !self.network.is_open(cell) {
                        continue;
                    }
                    match self.entry(cell, tick, dir) {
                        Entry::Open => {}
                        Entry::Later => {
                            blocked = true;
                            continue;
                        }
                        Entry::Never => continue,
                    }
                    self.visited[i] = true;
                    let idx = self.push(Node { cell, tick, dir, parent: Some(n) });
                    if cell == self.goal {
                        return Ok(Some(self.rebuild(idx)));
                    }
                    ring.push(idx);
                }

                if blocked {
                    if let Some(i) = self.network.index(node.cell) {
                        if self.waiting[i] != tick {
                            if let Some(w) = self.back_off(n) {
                                self.waiting[i] = tick;
                                ring.push(w);
                            }
                        }
                    }
                }
            }
            frontier = ring;
        }
        Ok(None)
    }

    /// A move into `cell` at `tick` is blocked if it collides, or if `cell`
    /// is the goal and the parking tick after arrival collides.
    fn entry(&self, cell: Cell, tick: u32, dir: Direction) -> Entry {
        if self.oracle.is_parked(cell) {
            Entry::Never
        } else if self.oracle.conflicts(cell, tick, dir)
            || (cell == self.goal && self.oracle.conflicts(cell, tick + 1, Direction::STILL))
        {
            Entry::Later
        } else {
            Entry::Open
        }
    }

    /// Make `n`'s path wait one tick, as late along the chain as is safe.
    /// Returns the node standing on `n`'s cell one tick after `n`, or `None`
    /// if no point on the chain can absorb the delay.
    fn back_off(&mut self, n: usize) -> Option<usize> {
        // Nodes after the anchor, nearest to `n` first.
        let mut replay: Vec<usize> = Vec::new();
        let mut anchor = n;
        loop {
            let a = self.arena[anchor];
            let wait_ok = !self.oracle.conflicts(a.cell, a.tick + 1, Direction::STILL);
            let replay_ok = wait_ok
                && replay.iter().all(|&r| {
                    let r = self.arena[r];
                    !self.oracle.conflicts(r.cell, r.tick + 1, r.dir)
                });

            if replay_ok {
                let mut prev = self.push(Node {
                    tick:   a.tick + 1,
                    dir:    Direction::STILL,
                    parent: Some(anchor),
                    ..a
                });
                for &r in replay.iter().rev() {
                    let r = self.arena[r];
                    prev = self.push(Node { tick: r.tick + 1, parent: Some(prev), ..r });
                }
                trace!(cell = %a.cell, tick = a.tick + 1, replayed = replay.len(), "inserted wait");
                return Some(prev);
            }
            replay.push(anchor);
            anchor = a.parent?;
        }
    }

    fn push(&mut self, node: Node) -> usize {
        self.arena.push(node);
        self.arena.len() - 1
    }

    /// Follow parent links back to the root.
    fn rebuild(&self, goal_idx: usize) -> Plan {
        let mut waypoints = Vec::with_capacity(self.arena[goal_idx].tick as usize + 1);
        let mut cur = Some(goal_idx);
        while let Some(i) = cur {
            let node = self.arena[i];
            waypoints.push(Waypoint::new(node.cell, node.tick, node.dir));
            cur = node.parent;
        }
        waypoints.reverse();
        Plan::new(waypoints)
    }
}
