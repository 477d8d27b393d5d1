//! Simulation error type.

use thiserror::Error;

use mapd_core::{ErrorKind, MapdError};
use mapd_fleet::FleetError;
use mapd_grid::GridError;
use mapd_plan::PlanError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("{what} length {got} does not match agent count {expected}")]
    AgentCountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error(transparent)]
    Core(#[from] MapdError),

    #[error("network error: {0}")]
    Grid(#[from] GridError),

    #[error("fleet error: {0}")]
    Fleet(#[from] FleetError),

    #[error("planning error: {0}")]
    Plan(#[from] PlanError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("trip file parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("run did not finish within {ticks} ticks")]
    Stalled { ticks: u64 },
}

impl SimError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SimError::Config(_)
            | SimError::AgentCountMismatch { .. }
            | SimError::Io(_)
            | SimError::Csv(_) => ErrorKind::Config,
            SimError::Core(e) => e.kind(),
            SimError::Grid(e) => e.kind(),
            SimError::Fleet(e) => e.kind(),
            SimError::Plan(e) => e.kind(),
            SimError::Stalled { .. } => ErrorKind::InvariantViolation,
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
