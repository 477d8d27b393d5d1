//! Framework error type and the shared error taxonomy.
//!
//! Every `mapd-*` crate keeps its own error enum and exposes a `kind()`
//! classifier returning [`ErrorKind`], so the driver can tell a bad
//! configuration apart from an internal bug without matching on every
//! variant.

use std::fmt;

use thiserror::Error;

/// Coarse classification shared by all crate error types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Rejected input: grid size, counts, scripted cells.
    Config,
    /// Internal guarantee broken (disconnected network, runaway search).
    InvariantViolation,
    /// Caller bug: an operation invoked in a state it does not accept.
    PreconditionViolation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Config                => "config",
            ErrorKind::InvariantViolation    => "invariant violation",
            ErrorKind::PreconditionViolation => "precondition violation",
        };
        f.write_str(s)
    }
}

/// Errors raised by `mapd-core` itself (configuration validation).
#[derive(Debug, Error)]
pub enum MapdError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MapdError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MapdError::Config(_) | MapdError::Io(_) => ErrorKind::Config,
        }
    }
}

/// Shorthand result type for `mapd-core`.
pub type MapdResult<T> = Result<T, MapdError>;
