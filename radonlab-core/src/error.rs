//! Core error taxonomy.

use thiserror::Error;

/// Errors raised while constructing room series and campaigns.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Malformed construction arguments: empty series, wrong slot count,
    /// missing or duplicated cellar slot, role/slot mismatch.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A start offset plus the seven-day span runs past the end of a series.
    #[error(
        "series '{identifier}' has {available} values but start {start} needs {required}"
    )]
    Range {
        identifier: String,
        start: usize,
        required: usize,
        available: usize,
    },
}

impl CoreError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
