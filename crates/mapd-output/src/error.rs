//! Error types for mapd-output.

use thiserror::Error;

use mapd_core::ErrorKind;

/// Errors that can occur when writing simulation output.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

impl OutputError {
    /// Output failures are environmental (paths, permissions, disk).
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Config
    }
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
