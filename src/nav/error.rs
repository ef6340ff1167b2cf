//! Navigation error types

use thiserror::Error;

use super::path::NavPath;

/// Errors raised by path parsing and panel navigation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    /// Input is not a well-formed absolute path
    #[error("invalid path {input:?}: {reason}")]
    InvalidPath { input: String, reason: &'static str },

    /// The data source has no node for the requested path
    #[error("path not found: {0}")]
    PathNotFound(NavPath),
}

impl NavError {
    pub(crate) fn invalid(input: &str, reason: &'static str) -> Self {
        Self::InvalidPath {
            input: input.to_string(),
            reason,
        }
    }
}

/// Rejected restoration schedules
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("restore schedule must contain at least one checkpoint")]
    Empty,

    #[error("restore schedule must be strictly increasing: checkpoint {index} ({next_ms} ms) does not follow {prev_ms} ms")]
    NotIncreasing {
        index: usize,
        prev_ms: u128,
        next_ms: u128,
    },
}
