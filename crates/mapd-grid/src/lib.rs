//! `mapd-grid`: the grid road network agents drive on.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`network`] | `CellKind`, `RoadNetwork`, `RoadNetworkBuilder`, repair     |
//! | [`reach`]   | `Bfs` discovery-order iterator, distances, connectivity     |
//! | [`error`]   | `GridError`, `GridResult<T>`                                |
//!
//! # Layout of a network
//!
//! The outermost ring and every cell with both coordinates even are grass.
//! Cells with both coordinates odd are intersections; the remaining road
//! cells are lanes joining them.  Obstacles only ever replace road cells, and
//! a network is never handed out unless every road cell reaches every other.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod error;
pub mod network;
pub mod reach;


pub use error::{GridError, GridResult};
pub use network::{CellKind, RoadNetwork, RoadNetworkBuilder};
pub use reach::Bfs;
