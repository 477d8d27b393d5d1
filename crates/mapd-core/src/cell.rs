//! Grid geometry: integer cell coordinates and unit move directions.
//!
//! `x` grows to the east, `y` grows to the south (screen order).  Every
//! search in the workspace enumerates neighbours in [`Direction::NEIGHBOR_ORDER`]
//! (+x, +y, −x, −y); tie-breaking between equally short routes depends on it.

use std::fmt;

// ── Direction ─────────────────────────────────────────────────────────────────

/// Arrival direction of a waypoint: one of the four unit moves, or
/// [`Direction::STILL`] for a wait.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Direction {
    pub dx: i8,
    pub dy: i8,
}

impl Direction {
    pub const EAST:  Direction = Direction { dx:  1, dy:  0 };
    pub const SOUTH: Direction = Direction { dx:  0, dy:  1 };
    pub const WEST:  Direction = Direction { dx: -1, dy:  0 };
    pub const NORTH: Direction = Direction { dx:  0, dy: -1 };
    pub const STILL: Direction = Direction { dx:  0, dy:  0 };

    /// Fixed expansion order used by every BFS in the workspace.
    pub const NEIGHBOR_ORDER: [Direction; 4] =
        [Direction::EAST, Direction::SOUTH, Direction::WEST, Direction::NORTH];

    #[inline]
    pub fn is_still(self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    /// `true` when both are moves along the same axis in exactly opposite
    /// senses.  Two agents arriving at one cell this way are passing through
    /// each other and are not in conflict.  A stationary party never is.
    #[inline]
    pub fn is_opposite(self, other: Direction) -> bool {
        !self.is_still() && self.dx == -other.dx && self.dy == -other.dy
    }

    /// The move that undoes this one.  `STILL` stays `STILL`.
    #[inline]
    pub fn reverse(self) -> Direction {
        Direction { dx: -self.dx, dy: -self.dy }
    }

    /// Direction of the unit move `from → to`, or `None` if the cells are not
    /// identical or orthogonally adjacent.
    pub fn between(from: Cell, to: Cell) -> Option<Direction> {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        match (dx, dy) {
            (0, 0) | (1, 0) | (-1, 0) | (0, 1) | (0, -1) => {
                Some(Direction { dx: dx as i8, dy: dy as i8 })
            }
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match (self.dx, self.dy) {
            (1, 0)  => "E",
            (0, 1)  => "S",
            (-1, 0) => "W",
            (0, -1) => "N",
            _       => "·",
        };
        f.write_str(s)
    }
}

// ── Cell ─────────────────────────────────────────────────────────────────────

/// A grid cell position.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell one move in `dir`.  Not bounds-checked.
    #[inline]
    pub fn step(self, dir: Direction) -> Cell {
        Cell::new(self.x + dir.dx as i32, self.y + dir.dy as i32)
    }

    /// The four orthogonal neighbours in [`Direction::NEIGHBOR_ORDER`].
    /// Not bounds-checked; callers filter with the network's `is_open`.
    #[inline]
    pub fn adjacent(self) -> [Cell; 4] {
        Direction::NEIGHBOR_ORDER.map(|d| self.step(d))
    }

    #[inline]
    pub fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
