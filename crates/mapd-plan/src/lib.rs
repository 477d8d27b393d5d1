//! `mapd-plan`: conflict-aware path planning over space and time.
//!
//! # How a plan is made
//!
//! ```text
//! ① Reserve   - index every other agent's committed plan by (cell, tick),
//!               re-based onto this agent's planning instant.
//! ② Search    - BFS ring by ring; ring i holds the cells reachable at
//!               tick offset i.  A candidate that collides with a
//!               reservation is not entered; its parent waits one tick
//!               instead, backing off along its own predecessors when
//!               waiting in place is itself unsafe.  Cells of agents
//!               that hold a task but no plan are parked: never entered.
//! ③ Rebuild   - follow parent links from the goal; waypoint index equals
//!               tick offset.
//! ```
//!
//! With no route at all the planner returns a one-tick holding plan from
//! [`holding_plan`] and the agent replans next tick.
//!
//! Two agents arriving at one cell along the same axis from opposite sides
//! pass through each other and do not collide.  Every other co-occupation
//! (same direction, perpendicular, or either party stationary) does.
//!
//! # Crate layout
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`reservation`] | `ConflictOracle`, `ReservationTable`, `TickProgress`  |
//! | [`search`]      | `plan_path` (time-expanded BFS), `holding_plan`       |
//! | [`planner`]     | `PathPlanner` trait, naive / wait-backoff planners    |
//! | [`error`]       | `PlanError`, `PlanResult<T>`                          |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                    |
//! |-----------|-----------------------------------------------------------|
//! | `fx-hash` | FxHash for the reservation table.                         |

pub mod error;
pub mod planner;
pub mod reservation;
pub mod search;


pub use error::{PlanError, PlanResult};
pub use planner::{NaivePlanner, PathPlanner, PlanningContext, VariantPlanner, WaitBackoffPlanner};
pub use reservation::{ConflictOracle, NoReservations, Reservation, ReservationTable, TickProgress};
pub use search::{holding_plan, plan_path};
