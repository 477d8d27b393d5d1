//! Planning error type.

use thiserror::Error;

use mapd_core::{AgentId, Cell, ErrorKind};

/// Errors produced by `mapd-plan`.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("{0} has no task to plan for")]
    NoTask(AgentId),

    #[error("cannot plan from or to closed cell {0}")]
    ClosedCell(Cell),

    #[error("no plan from {start} to {goal} within {bound} ticks")]
    TickBoundExceeded { start: Cell, goal: Cell, bound: u32 },
}

impl PlanError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlanError::TickBoundExceeded { .. } => ErrorKind::InvariantViolation,
            PlanError::NoTask(_) | PlanError::ClosedCell(_) => ErrorKind::PreconditionViolation,
        }
    }
}

pub type PlanResult<T> = Result<T, PlanError>;
