//! Who occupies which cell at which tick, as seen by the agent being planned.
//!
//! # Effective ticks
//!
//! Every tick offset in this module is relative to the planning agent's
//! planning instant: offset 0 is "now, before this agent steps", offset 1 is
//! "after this agent's step this tick".
//!
//! Another agent `b` with cursor `c` stands on `plan_b[c + 1]` until it
//! steps.  If `b` has not stepped yet this tick (it comes later in the
//! processing order) its waypoint `k` is reached at offset `k - c - 1`; if it
//! already stepped, its cursor has moved on and the same waypoint is reached
//! at offset `k - c`.  [`TickProgress`] records which agents have stepped.
//!
//! # Parking
//!
//! An agent whose plan ends on a waypoint stays there one more tick (it picks
//! up or drops off, then replans), so the final waypoint is also reserved one
//! tick later.
//!
//! An agent holding a task but no plan (just picked up, or held and about to
//! replan) has no known future.  Its cell is *parked*: every arrival there at
//! any offset collides, until the agent has a plan again.  An idle agent may
//! be dispatched later this tick, so its cell is reserved for offset 1.
//! Retired agents hold no reservations.

use mapd_core::{AgentId, Cell, Direction};
use mapd_fleet::{FleetStore, Plan};

#[cfg(feature = "fx-hash")]
type SlotMap = rustc_hash::FxHashMap<(Cell, u32), Vec<Reservation>>;
#[cfg(not(feature = "fx-hash"))]
type SlotMap = std::collections::HashMap<(Cell, u32), Vec<Reservation>>;

#[cfg(feature = "fx-hash")]
type CellSet = rustc_hash::FxHashSet<Cell>;
#[cfg(not(feature = "fx-hash"))]
type CellSet = std::collections::HashSet<Cell>;

// ── ConflictOracle ────────────────────────────────────────────────────────────

/// Answers "may I arrive at `cell` at `tick` moving in `dir`?".
pub trait ConflictOracle {
    /// `true` if the arrival collides with someone already committed there.
    fn conflicts(&self, cell: Cell, tick: u32, dir: Direction) -> bool;

    /// `true` if a parked agent stands on `cell`.  Arrivals there collide at
    /// every tick, so waiting for the cell is pointless.
    fn is_parked(&self, cell: Cell) -> bool;

    /// Latest tick holding any slot reservation.  Beyond it only parked
    /// cells collide.
    fn horizon(&self) -> u32;
}

/// Oracle for the naive planner: nothing is ever reserved.
pub struct NoReservations;

impl ConflictOracle for NoReservations {
    #[inline]
    fn conflicts(&self, _cell: Cell, _tick: u32, _dir: Direction) -> bool {
        false
    }

    #[inline]
    fn is_parked(&self, _cell: Cell) -> bool {
        false
    }

    #[inline]
    fn horizon(&self) -> u32 {
        0
    }
}

// ── TickProgress ──────────────────────────────────────────────────────────────

/// Which agents have already stepped during the current tick.
#[derive(Clone, Debug, Default)]
pub struct TickProgress {
    stepped: Vec<bool>,
}

impl TickProgress {
    pub fn new(agent_count: usize) -> Self {
        Self { stepped: vec![false; agent_count] }
    }

    /// Start a new tick: nobody has stepped.
    pub fn reset(&mut self) {
        self.stepped.fill(false);
    }

    pub fn mark_stepped(&mut self, agent: AgentId) {
        if let Some(s) = self.stepped.get_mut(agent.index()) {
            *s = true;
        }
    }

    #[inline]
    pub fn has_stepped(&self, agent: AgentId) -> bool {
        self.stepped.get(agent.index()).copied().unwrap_or(false)
    }
}

// ── ReservationTable ──────────────────────────────────────────────────────────

/// One agent's claim on a `(cell, tick)` slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Reservation {
    pub agent: AgentId,
    /// Arrival direction; `STILL` when waiting or parked.
    pub dir:   Direction,
}

/// `(cell, tick) → reservations` index with O(1) lookups, plus the set of
/// parked cells.
#[derive(Default)]
pub struct ReservationTable {
    slots:   SlotMap,
    parked:  CellSet,
    horizon: u32,
}

impl ReservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed plans of every agent except `planning`, re-based onto
    /// `planning`'s instant.
    pub fn from_fleet(fleet: &FleetStore, progress: &TickProgress, planning: AgentId) -> Self {
        let mut table = Self::new();
        for b in fleet.agents.iter().filter(|b| b.id != planning && b.active) {
            if !b.plan.is_empty() {
                let lag = if progress.has_stepped(b.id) { 0 } else { 1 };
                table.reserve_plan(b.id, &b.plan, b.cursor + lag);
            } else if b.task.is_some() {
                table.park(b.pos);
            } else {
                table.reserve(b.pos, 1, b.id, Direction::STILL);
            }
        }
        table
    }

    /// Reserve `plan`'s waypoints from its current one onward: waypoint `k`
    /// lands on offset `k - shift`.  Past offsets are dropped.  The final
    /// waypoint is held one tick longer.
    pub fn reserve_plan(&mut self, agent: AgentId, plan: &Plan, shift: isize) {
        for (k, w) in plan.waypoints.iter().enumerate() {
            let at = k as isize - shift;
            if at >= 1 {
                self.reserve(w.cell, at as u32, agent, w.dir);
            }
        }
        if let Some(last) = plan.last() {
            let hold = plan.len() as isize - shift;
            if hold >= 1 {
                self.reserve(last.cell, hold as u32, agent, Direction::STILL);
            }
        }
    }

    pub fn reserve(&mut self, cell: Cell, tick: u32, agent: AgentId, dir: Direction) {
        self.slots.entry((cell, tick)).or_default().push(Reservation { agent, dir });
        self.horizon = self.horizon.max(tick);
    }

    /// Hold `cell` against every arrival until the table is rebuilt.
    pub fn park(&mut self, cell: Cell) {
        self.parked.insert(cell);
    }

    /// Reservations on `(cell, tick)`.
    pub fn at(&self, cell: Cell, tick: u32) -> &[Reservation] {
        self.slots.get(&(cell, tick)).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.parked.is_empty()
    }
}

impl ConflictOracle for ReservationTable {
    fn conflicts(&self, cell: Cell, tick: u32, dir: Direction) -> bool {
        self.parked.contains(&cell) || self.at(cell, tick).iter().any(|r| !dir.is_opposite(r.dir))
    }

    fn is_parked(&self, cell: Cell) -> bool {
        self.parked.contains(&cell)
    }

    fn horizon(&self) -> u32 {
        self.horizon
    }
}
