//! `mapd-fleet`: agents, tasks, and who serves whom.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`agent`]      | `Agent`, `AgentPhase`                                     |
//! | [`task`]       | `Task`, `TaskStatus`                                      |
//! | [`plan`]       | `Waypoint`, `Plan`                                        |
//! | [`store`]      | `FleetStore` (agents by index, tasks by id)               |
//! | [`builder`]    | `FleetBuilder` (explicit or random spawn cells)           |
//! | [`dispatch`]   | `Dispatcher` (nearest-first BFS assignment)               |
//! | [`error`]      | `FleetError`, `FleetResult<T>`                            |
//!
//! Agents and tasks refer to each other by id only.  The store owns tasks
//! until delivery; each agent owns its plan.
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                    |
//! |-----------|-----------------------------------------------------------|
//! | `fx-hash` | FxHash for the dispatcher's per-call cell index.          |
//! | `serde`   | Derives `Serialize`/`Deserialize` on all public types.    |

pub mod agent;
pub mod builder;
pub mod dispatch;
pub mod error;
pub mod plan;
pub mod store;
pub mod task;

#[cfg(test)]
mod tests;

pub use agent::{Agent, AgentPhase};
pub use builder::FleetBuilder;
pub use dispatch::Dispatcher;
pub use error::{FleetError, FleetResult};
pub use plan::{Plan, Waypoint};
pub use store::FleetStore;
pub use task::{Task, TaskStatus};
