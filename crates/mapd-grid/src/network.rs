//! Road network representation, builder, and connectivity repair.
//!
//! # Data layout
//!
//! A `size × size` grid stored row-major: the kind of cell `(x, y)` lives at
//! `kinds[y * size + x]`.  "Row-major order" below always means this scan
//! order, and it is the tie-breaker wherever the network picks one cell
//! among equals.
//!
//! # Repair
//!
//! Random obstacles can cut the lattice apart.  After placement the builder
//! looks for the first road cell (row-major) that the reference cell (the
//! first road cell) cannot reach, reopens the obstacle nearest to it by
//! Manhattan distance, and repeats.  Every round removes one obstacle, so
//! repair ends after at most `obstacle_count` rounds.

use tracing::debug;

use mapd_core::{Cell, SimRng};

use crate::reach;
use crate::{GridError, GridResult};

// ── CellKind ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellKind {
    /// Open cell an agent may occupy.
    Road,
    /// Outer ring and even/even cells.  Never open.
    Border,
    /// Road cell closed off by an obstacle.
    Obstacle,
}

impl CellKind {
    /// Kind of `(x, y)` on the obstacle-free lattice of side `size`.
    #[inline]
    fn lattice(size: i32, x: i32, y: i32) -> CellKind {
        let edge = x == 0 || y == 0 || x == size - 1 || y == size - 1;
        if edge || (x % 2 == 0 && y % 2 == 0) {
            CellKind::Border
        } else {
            CellKind::Road
        }
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Square grid of cells, every road cell reachable from every other.
///
/// Immutable once built.  Do not construct directly; use
/// [`RoadNetworkBuilder`] or [`RoadNetwork::generate`].
#[derive(Clone, Debug)]
pub struct RoadNetwork {
    /// Side length.  Odd, at least 5.
    pub size: i32,
    /// Row-major cell kinds, `size * size` entries.
    pub kinds: Vec<CellKind>,
}

impl RoadNetwork {
    /// Build a network with `obstacle_count` obstacles placed on distinct,
    /// uniformly chosen lane cells, then repaired to full connectivity.
    pub fn generate(size: i32, obstacle_count: u32, rng: &mut SimRng) -> GridResult<RoadNetwork> {
        check_size(size)?;
        let mut lanes = lane_cells(size);
        if obstacle_count as usize > lanes.len() {
            return Err(GridError::TooManyObstacles {
                requested: obstacle_count,
                available: lanes.len() as u32,
            });
        }
        rng.shuffle(&mut lanes);

        let mut b = RoadNetworkBuilder::new(size);
        for &cell in lanes.iter().take(obstacle_count as usize) {
            b.add_obstacle(cell);
        }
        b.build()
    }

    // ── Indexing ──────────────────────────────────────────────────────────

    pub fn cell_count(&self) -> usize {
        self.kinds.len()
    }

    /// Row-major index of `cell`, or `None` if it lies outside the grid.
    #[inline]
    pub fn index(&self, cell: Cell) -> Option<usize> {
        if cell.x < 0 || cell.y < 0 || cell.x >= self.size || cell.y >= self.size {
            return None;
        }
        Some((cell.y * self.size + cell.x) as usize)
    }

    /// Inverse of [`index`](Self::index).
    #[inline]
    pub fn cell_at(&self, index: usize) -> Cell {
        let i = index as i32;
        Cell::new(i % self.size, i / self.size)
    }

    // ── Cell queries ──────────────────────────────────────────────────────

    /// Kind of `cell`; `None` outside the grid.
    #[inline]
    pub fn kind(&self, cell: Cell) -> Option<CellKind> {
        self.index(cell).map(|i| self.kinds[i])
    }

    /// `true` for road cells.  Out-of-bounds cells are closed.
    #[inline]
    pub fn is_open(&self, cell: Cell) -> bool {
        self.kind(cell) == Some(CellKind::Road)
    }

    /// The four orthogonal neighbours of `cell` in the fixed order
    /// (+x, +y, −x, −y).  Not bounds-checked and not filtered.
    #[inline]
    pub fn adjacent(&self, cell: Cell) -> [Cell; 4] {
        cell.adjacent()
    }

    /// Open neighbours of `cell`, in the fixed order.
    pub fn open_neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        cell.adjacent().into_iter().filter(|&c| self.is_open(c))
    }

    /// All road cells in row-major order.
    pub fn open_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells_of(CellKind::Road)
    }

    pub fn obstacles(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells_of(CellKind::Obstacle)
    }

    pub fn open_count(&self) -> usize {
        self.kinds.iter().filter(|&&k| k == CellKind::Road).count()
    }

    fn cells_of(&self, kind: CellKind) -> impl Iterator<Item = Cell> + '_ {
        self.kinds
            .iter()
            .enumerate()
            .filter(move |&(_, &k)| k == kind)
            .map(|(i, _)| self.cell_at(i))
    }

    // ── Reachability ──────────────────────────────────────────────────────

    /// BFS reachability between two cells.  Closed endpoints are never
    /// connected.
    pub fn is_connected(&self, a: Cell, b: Cell) -> bool {
        self.distance(a, b).is_some()
    }

    /// Shortest path length in moves, `None` if unreachable.
    pub fn distance(&self, a: Cell, b: Cell) -> Option<u32> {
        if !self.is_open(a) || !self.is_open(b) {
            return None;
        }
        reach::Bfs::new(self, a).find(|&(c, _)| c == b).map(|(_, d)| d)
    }

    /// `true` if every road cell reaches every other one.
    pub fn is_fully_connected(&self) -> bool {
        self.first_stranded().is_none()
    }

    /// First road cell (row-major) the reference cell cannot reach, paired
    /// with that reference.
    fn first_stranded(&self) -> Option<(Cell, Cell)> {
        let reference = self.open_cells().next()?;
        let reached = reach::reachable(self, reference);
        self.open_cells()
            .find(|&c| self.index(c).is_some_and(|i| !reached[i]))
            .map(|c| (c, reference))
    }

    /// Reopen obstacles until the network is connected.  Returns the number
    /// of obstacles reopened.
    fn repair(&mut self) -> usize {
        let mut reopened = 0;
        while let Some((stranded, _)) = self.first_stranded() {
            let Some(nearest) = self.obstacles().min_by_key(|o| o.manhattan(stranded)) else {
                break;
            };
            if let Some(i) = self.index(nearest) {
                self.kinds[i] = CellKind::Road;
            }
            reopened += 1;
            debug!(%stranded, %nearest, "reopened obstacle to reconnect road cell");
        }
        reopened
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Place obstacles explicitly, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use mapd_core::Cell;
/// use mapd_grid::RoadNetworkBuilder;
///
/// let mut b = RoadNetworkBuilder::new(5);
/// b.add_obstacle(Cell::new(2, 1));
/// let net = b.build().unwrap();
/// assert!(!net.is_open(Cell::new(2, 1)));
/// assert_eq!(net.open_count(), 7);
/// ```
pub struct RoadNetworkBuilder {
    size:      i32,
    obstacles: Vec<Cell>,
}

impl RoadNetworkBuilder {
    pub fn new(size: i32) -> Self {
        Self { size, obstacles: Vec::new() }
    }

    /// Close a road cell.  Duplicates are ignored.
    pub fn add_obstacle(&mut self, cell: Cell) -> &mut Self {
        if !self.obstacles.contains(&cell) {
            self.obstacles.push(cell);
        }
        self
    }

    /// Consume the builder and produce a connected [`RoadNetwork`].
    ///
    /// Obstacles that would disconnect the network are reopened (see the
    /// module docs), so the result may hold fewer obstacles than requested.
    pub fn build(self) -> GridResult<RoadNetwork> {
        check_size(self.size)?;
        let size = self.size;

        let kinds = (0..size * size)
            .map(|i| CellKind::lattice(size, i % size, i / size))
            .collect();
        let mut net = RoadNetwork { size, kinds };

        for &cell in &self.obstacles {
            match net.index(cell) {
                Some(i) if net.kinds[i] == CellKind::Road => net.kinds[i] = CellKind::Obstacle,
                _ => return Err(GridError::InvalidObstacle(cell)),
            }
        }

        let reopened = net.repair();
        if let Some((stranded, reference)) = net.first_stranded() {
            return Err(GridError::Disconnected { stranded, reference });
        }

        debug!(
            size,
            requested = self.obstacles.len(),
            reopened,
            open = net.open_count(),
            "road network built"
        );
        Ok(net)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn check_size(size: i32) -> GridResult<()> {
    if size < 5 || size % 2 == 0 {
        return Err(GridError::InvalidSize(size));
    }
    Ok(())
}

/// Road cells with exactly one even coordinate, row-major.
pub fn lane_cells(size: i32) -> Vec<Cell> {
    let mut out = Vec::new();
    for y in 1..size - 1 {
        for x in 1..size - 1 {
            if (x % 2 == 0) != (y % 2 == 0) {
                out.push(Cell::new(x, y));
            }
        }
    }
    out
}
