//! `mapd-core`: foundational types for the `rust_mapd` fleet simulator.
//!
//! This crate is a dependency of every other `mapd-*` crate.  It has no
//! `mapd-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `TaskId`                                   |
//! | [`cell`]        | `Cell`, `Direction`, fixed neighbour order            |
//! | [`time`]        | `Tick`, `SimClock`                                    |
//! | [`config`]      | `RunConfig`, `PlannerVariant`, `PriorityScheme`       |
//! | [`rng`]         | `SimRng`, `mix_seed`                                  |
//! | [`error`]       | `MapdError`, `MapdResult`, `ErrorKind`                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required to read `RunConfig` from JSON.                    |

pub mod cell;
pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use cell::{Cell, Direction};
pub use config::{PlannerVariant, PriorityScheme, RunConfig};
pub use error::{ErrorKind, MapdError, MapdResult};
pub use ids::{AgentId, TaskId};
pub use rng::{SimRng, mix_seed};
pub use time::{SimClock, Tick};
