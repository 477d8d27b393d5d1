//! Where tasks come from.
//!
//! The stepper asks its [`TaskSource`] for a new trip whenever the release
//! rule allows one.  Two sources ship with the crate:
//!
//! | Source            | Trips                                                |
//! |-------------------|------------------------------------------------------|
//! | [`RandomTasks`]   | Uniform origins, destinations at least a minimum     |
//! |                   | Manhattan distance away.                             |
//! | [`ScriptedTasks`] | A fixed list, handed out in order.                   |
//!
//! # CSV format
//!
//! [`load_trips_csv`] reads one trip per row:
//!
//! ```csv
//! origin_x,origin_y,dest_x,dest_y
//! 3,1,1,3
//! 5,5,1,1
//! ```

use std::collections::VecDeque;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use mapd_core::{Cell, SimRng};
use mapd_fleet::FleetStore;
use mapd_grid::RoadNetwork;

use crate::SimResult;

/// Origin and destination of a task not yet created.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Trip {
    pub origin:      Cell,
    pub destination: Cell,
}

impl Trip {
    pub fn new(origin: Cell, destination: Cell) -> Self {
        Self { origin, destination }
    }
}

/// Supplies trips to the stepper, one per released task.
pub trait TaskSource: Send {
    /// The next trip, or `None` if the source has run dry.
    fn next_trip(&mut self, network: &RoadNetwork, fleet: &FleetStore) -> Option<Trip>;
}

// ── RandomTasks ───────────────────────────────────────────────────────────────

/// Random trips drawn from the road cells.
///
/// The origin avoids cells where an agent carrying a task stands.  The
/// destination is at least `min_distance` (and never less than 1) away from
/// the origin; when no road cell is that far, one of the farthest cells is
/// used instead.
pub struct RandomTasks {
    rng:          SimRng,
    min_distance: u32,
}

impl RandomTasks {
    pub fn new(rng: SimRng, min_distance: u32) -> Self {
        Self { rng, min_distance }
    }
}

impl TaskSource for RandomTasks {
    fn next_trip(&mut self, network: &RoadNetwork, fleet: &FleetStore) -> Option<Trip> {
        let open: Vec<Cell> = network.open_cells().collect();
        let busy: Vec<Cell> = fleet
            .agents
            .iter()
            .filter(|a| a.task.is_some())
            .map(|a| a.pos)
            .collect();
        let free: Vec<Cell> = open.iter().copied().filter(|c| !busy.contains(c)).collect();
        let origin = *self.rng.choose(if free.is_empty() { &open } else { &free })?;

        let min = self.min_distance.max(1);
        let mut far: Vec<Cell> = open.iter().copied().filter(|c| c.manhattan(origin) >= min).collect();
        if far.is_empty() {
            let max = open.iter().map(|c| c.manhattan(origin)).max()?;
            far = open.into_iter().filter(|c| c.manhattan(origin) == max).collect();
        }
        let destination = *self.rng.choose(&far)?;
        Some(Trip { origin, destination })
    }
}

// ── ScriptedTasks ─────────────────────────────────────────────────────────────

/// A fixed list of trips, released in order.
#[derive(Clone, Debug, Default)]
pub struct ScriptedTasks {
    trips: VecDeque<Trip>,
}

impl ScriptedTasks {
    pub fn new(trips: impl IntoIterator<Item = Trip>) -> Self {
        Self { trips: trips.into_iter().collect() }
    }

    /// Trips not yet handed out.
    pub fn remaining(&self) -> usize {
        self.trips.len()
    }
}

impl TaskSource for ScriptedTasks {
    fn next_trip(&mut self, _network: &RoadNetwork, _fleet: &FleetStore) -> Option<Trip> {
        self.trips.pop_front()
    }
}

// ── CSV loading ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TripRecord {
    origin_x: i32,
    origin_y: i32,
    dest_x:   i32,
    dest_y:   i32,
}

/// Load scripted trips from a CSV file.
///
/// Cells are not checked against any network here; the stepper rejects a
/// trip touching a closed cell when it is released.
pub fn load_trips_csv(path: &Path) -> SimResult<Vec<Trip>> {
    let file = std::fs::File::open(path)?;
    load_trips_reader(file)
}

/// Like [`load_trips_csv`] but accepts any `Read` source.
pub fn load_trips_reader<R: Read>(reader: R) -> SimResult<Vec<Trip>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut trips = Vec::new();
    for result in csv_reader.deserialize::<TripRecord>() {
        let r = result?;
        trips.push(Trip {
            origin:      Cell::new(r.origin_x, r.origin_y),
            destination: Cell::new(r.dest_x, r.dest_y),
        });
    }
    Ok(trips)
}
