//! Fleet-subsystem error type.

use thiserror::Error;

use mapd_core::{AgentId, Cell, ErrorKind, TaskId};

/// Errors produced by `mapd-fleet`.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("dispatch from {from} with an empty pool of {pool}")]
    EmptyPool { from: Cell, pool: &'static str },

    #[error("no {pool} reachable from {from}")]
    Unreachable { from: Cell, pool: &'static str },

    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    #[error("{agent} cannot take {task}: {reason}")]
    InvalidAssignment {
        agent:  AgentId,
        task:   TaskId,
        reason: &'static str,
    },

    #[error("{0} has no task to complete")]
    NoTask(AgentId),

    #[error("cannot spawn fleet: {0}")]
    InvalidSpawn(String),
}

impl FleetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FleetError::Unreachable { .. } => ErrorKind::InvariantViolation,
            FleetError::InvalidSpawn(_) => ErrorKind::Config,
            _ => ErrorKind::PreconditionViolation,
        }
    }
}

pub type FleetResult<T> = Result<T, FleetError>;
