//! Time-indexed plans.
//!
//! Waypoint `i` of a plan is where the agent stands `i` ticks after the plan
//! was made; waypoint 0 is its position at planning time.  Consecutive
//! waypoints are either identical (a wait) or one orthogonal move apart.

use mapd_core::{Cell, Direction};

/// One `(cell, tick offset, arrival direction)` triple of a plan.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Waypoint {
    pub cell:   Cell,
    /// Ticks after the planning instant.
    pub offset: u32,
    /// How the agent arrived here; `STILL` for waits and the start cell.
    pub dir:    Direction,
}

impl Waypoint {
    #[inline]
    pub fn new(cell: Cell, offset: u32, dir: Direction) -> Self {
        Self { cell, offset, dir }
    }
}

/// An ordered list of waypoints, start first, sub-goal last.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Plan {
    pub waypoints: Vec<Waypoint>,
}

impl Plan {
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        Self { waypoints }
    }

    /// Build a plan from a cell sequence, deriving offsets and directions.
    /// Returns `None` if two consecutive cells are neither identical nor
    /// adjacent.
    pub fn from_cells(cells: &[Cell]) -> Option<Plan> {
        let mut waypoints = Vec::with_capacity(cells.len());
        for (i, &cell) in cells.iter().enumerate() {
            let dir = match i {
                0 => Direction::STILL,
                _ => Direction::between(cells[i - 1], cell)?,
            };
            waypoints.push(Waypoint::new(cell, i as u32, dir));
        }
        Some(Plan { waypoints })
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<&Waypoint> {
        self.waypoints.get(i)
    }

    pub fn first(&self) -> Option<&Waypoint> {
        self.waypoints.first()
    }

    pub fn last(&self) -> Option<&Waypoint> {
        self.waypoints.last()
    }

    /// Number of ticks spent waiting in place.
    pub fn wait_count(&self) -> usize {
        self.waypoints.iter().skip(1).filter(|w| w.dir.is_still()).count()
    }

    /// Offset of the first waypoint at `cell`, if any.
    pub fn first_visit(&self, cell: Cell) -> Option<u32> {
        self.waypoints.iter().find(|w| w.cell == cell).map(|w| w.offset)
    }

    /// `true` if offsets count up from 0 by one, every step is a wait or a
    /// single orthogonal move, and each direction matches its step.
    pub fn is_well_formed(&self) -> bool {
        let Some(first) = self.first() else { return true };
        if first.offset != 0 {
            return false;
        }
        self.waypoints.windows(2).all(|pair| {
            let (a, b) = (pair[0], pair[1]);
            b.offset == a.offset + 1 && Direction::between(a.cell, b.cell) == Some(b.dir)
        })
    }
}
