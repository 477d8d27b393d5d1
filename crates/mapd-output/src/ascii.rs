//! Plain-text grid frames.
//!
//! Each cell is two characters wide:
//!
//! | Symbol | Cell                                                  |
//! |--------|-------------------------------------------------------|
//! | `--`   | an active agent                                       |
//! | `X.`   | a pickup and a drop-off point                         |
//! | `P.`   | a task waiting to be picked up                        |
//! | `D.`   | an outstanding task's drop-off point                  |
//! | `[]`   | closed (border or obstacle)                           |
//! | `  `   | open road                                             |
//!
//! Earlier rows of the table win when a cell qualifies for several.

use std::collections::HashSet;

use mapd_core::Cell;
use mapd_fleet::{FleetStore, TaskStatus};
use mapd_grid::RoadNetwork;

/// Render one frame, rows top to bottom, each row ending in `\n`.
pub fn render_ascii(network: &RoadNetwork, fleet: &FleetStore) -> String {
    let agents: HashSet<Cell> = fleet.agents.iter().filter(|a| a.active).map(|a| a.pos).collect();
    let pickups: HashSet<Cell> = fleet
        .tasks()
        .filter(|t| t.status != TaskStatus::InTransit)
        .map(|t| t.origin)
        .collect();
    let dropoffs: HashSet<Cell> = fleet.tasks().map(|t| t.destination).collect();

    let size = network.size.max(0) as usize;
    let mut out = String::with_capacity(size * (2 * size + 1));
    for y in 0..network.size {
        for x in 0..network.size {
            let cell = Cell::new(x, y);
            let symbol = if !network.is_open(cell) {
                "[]"
            } else if agents.contains(&cell) {
                "--"
            } else {
                match (pickups.contains(&cell), dropoffs.contains(&cell)) {
                    (true, true) => "X.",
                    (true, false) => "P.",
                    (false, true) => "D.",
                    (false, false) => "  ",
                }
            };
            out.push_str(symbol);
        }
        out.push('\n');
    }
    out
}

/// Frame preceded by a one-line status header.
pub fn render_frame(network: &RoadNetwork, fleet: &FleetStore, header: &str) -> String {
    format!("{header}\n{}", render_ascii(network, fleet))
}
