//! Grid-subsystem error type.

use thiserror::Error;

use mapd_core::{Cell, ErrorKind};

/// Errors produced by `mapd-grid`.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("grid size must be odd and at least 5, got {0}")]
    InvalidSize(i32),

    #[error("{requested} obstacles requested but only {available} lane cells exist")]
    TooManyObstacles { requested: u32, available: u32 },

    #[error("obstacle at {0} is not a road cell")]
    InvalidObstacle(Cell),

    #[error("road cell {stranded} unreachable from {reference} after repair")]
    Disconnected { stranded: Cell, reference: Cell },
}

impl GridError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GridError::Disconnected { .. } => ErrorKind::InvariantViolation,
            _ => ErrorKind::Config,
        }
    }
}

pub type GridResult<T> = Result<T, GridError>;
