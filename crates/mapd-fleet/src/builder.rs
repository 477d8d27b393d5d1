//! Fluent builder for the initial fleet.
//!
//! # Usage
//!
//! ```rust
//! use mapd_core::SimRng;
//! use mapd_fleet::FleetBuilder;
//! use mapd_grid::RoadNetworkBuilder;
//!
//! let net = RoadNetworkBuilder::new(7).build().unwrap();
//! let fleet = FleetBuilder::new(4).build(&net, &mut SimRng::new(42)).unwrap();
//! assert_eq!(fleet.agent_count(), 4);
//! ```

use std::collections::HashSet;

use mapd_core::{Cell, SimRng};
use mapd_grid::RoadNetwork;

use crate::{FleetError, FleetResult, FleetStore};

/// Places `count` agents on distinct road cells, either the cells given via
/// [`positions`](Self::positions) or uniformly random ones.
pub struct FleetBuilder {
    count:     usize,
    positions: Option<Vec<Cell>>,
}

impl FleetBuilder {
    pub fn new(count: usize) -> Self {
        Self { count, positions: None }
    }

    /// Use these spawn cells instead of random ones.  Agent `i` starts on
    /// `positions[i]`.
    pub fn positions(mut self, positions: Vec<Cell>) -> Self {
        self.positions = Some(positions);
        self
    }

    pub fn build(self, network: &RoadNetwork, rng: &mut SimRng) -> FleetResult<FleetStore> {
        let positions = match self.positions {
            Some(p) => {
                check_positions(network, self.count, &p)?;
                p
            }
            None => {
                let mut open: Vec<Cell> = network.open_cells().collect();
                if open.len() < self.count {
                    return Err(FleetError::InvalidSpawn(format!(
                        "{} agents but only {} road cells",
                        self.count,
                        open.len()
                    )));
                }
                rng.shuffle(&mut open);
                open.truncate(self.count);
                open
            }
        };
        Ok(FleetStore::new(positions))
    }
}

fn check_positions(network: &RoadNetwork, count: usize, positions: &[Cell]) -> FleetResult<()> {
    if positions.len() != count {
        return Err(FleetError::InvalidSpawn(format!(
            "{} spawn cells given for {} agents",
            positions.len(),
            count
        )));
    }
    let mut seen = HashSet::with_capacity(positions.len());
    for &cell in positions {
        if !network.is_open(cell) {
            return Err(FleetError::InvalidSpawn(format!("{cell} is not a road cell")));
        }
        if !seen.insert(cell) {
            return Err(FleetError::InvalidSpawn(format!("two agents spawn on {cell}")));
        }
    }
    Ok(())
}
