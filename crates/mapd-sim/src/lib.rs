//! `mapd-sim`: tick loop orchestrator for the rust_mapd fleet simulator.
//!
//! # Tick loop
//!
//! ```text
//! until delivered == required:
//!   ① Release  - new tasks while outstanding < agents and
//!                outstanding + delivered < required.
//!   ◇ Escort   - a stalled agent, if one is being escorted, steps first;
//!                a lone agent in its way trades places with it.
//!   ② Move     - in priority order (ascending task id or agent id):
//!                  idle       → Dispatcher (nearest free counterpart)
//!                  no plan    → PathPlanner
//!                  step       → advance one waypoint, or hold if the target
//!                               is claimed by an earlier agent this tick
//!                               (opposite directions pass through)
//!                  hold       → push back earlier agents that moved into
//!                               the held agent's cell, recursively
//!   ③ Arrivals - pickup: task in transit, plan cleared.
//!                drop-off: task removed, agent freed.  Agents without a
//!                task retire once no further tasks remain to be released.
//!   ④ Stalls   - per-agent counters; pick a new escort when an agent has
//!                been held or without a route for too long.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs batch repetitions on Rayon's thread pool.         |
//! | `fx-hash`  | FxHash for the claim index and reservation table.      |
//! | `serde`    | Serde derives on the core configuration types.         |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use mapd_core::RunConfig;
//! use mapd_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(RunConfig::default()).build()?;
//! let summary = sim.run(&mut NoopObserver)?;
//! println!("{} ticks, cost {}", summary.elapsed_ticks, summary.total_cost);
//! ```

pub mod batch;
pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;
mod stall;
pub mod tasks;


pub use batch::{BatchResult, BatchSweep, run_batch};
pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, RunSummary, SimObserver, TickStats};
pub use sim::Sim;
pub use tasks::{RandomTasks, ScriptedTasks, TaskSource, Trip, load_trips_csv, load_trips_reader};
