//! Breadth-first traversal over road cells.
//!
//! [`Bfs`] yields cells in discovery order: the start cell first, then ring
//! by ring, each ring in the order its cells were discovered from the
//! previous one with neighbours taken in the fixed (+x, +y, −x, −y) order.
//! Nearest-first searches (dispatch, connectivity) are built on that order,
//! which is what makes their tie-breaking deterministic.

use std::collections::VecDeque;

use mapd_core::Cell;

use crate::RoadNetwork;

/// Discovery-order BFS iterator yielding `(cell, distance)`.
///
/// Starting from a closed cell yields nothing.
pub struct Bfs<'a> {
    network: &'a RoadNetwork,
    visited: Vec<bool>,
    queue:   VecDeque<(Cell, u32)>,
}

impl<'a> Bfs<'a> {
    pub fn new(network: &'a RoadNetwork, start: Cell) -> Self {
        let mut visited = vec![false; network.cell_count()];
        let mut queue = VecDeque::new();
        if let Some(i) = network.index(start).filter(|_| network.is_open(start)) {
            visited[i] = true;
            queue.push_back((start, 0));
        }
        Self { network, visited, queue }
    }
}

impl Iterator for Bfs<'_> {
    type Item = (Cell, u32);

    fn next(&mut self) -> Option<(Cell, u32)> {
        let (cell, dist) = self.queue.pop_front()?;
        for next in self.network.open_neighbors(cell) {
            if let Some(i) = self.network.index(next) {
                if !self.visited[i] {
                    self.visited[i] = true;
                    self.queue.push_back((next, dist + 1));
                }
            }
        }
        Some((cell, dist))
    }
}

/// Row-major reachability mask from `start`.
pub fn reachable(network: &RoadNetwork, start: Cell) -> Vec<bool> {
    let mut mask = vec![false; network.cell_count()];
    for (cell, _) in Bfs::new(network, start) {
        if let Some(i) = network.index(cell) {
            mask[i] = true;
        }
    }
    mask
}

/// Row-major BFS distances from `start`; `None` for closed or unreachable
/// cells.
pub fn distances_from(network: &RoadNetwork, start: Cell) -> Vec<Option<u32>> {
    let mut out = vec![None; network.cell_count()];
    for (cell, d) in Bfs::new(network, start) {
        if let Some(i) = network.index(cell) {
            out[i] = Some(d);
        }
    }
    out
}
