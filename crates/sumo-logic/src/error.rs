//! Configuration errors
//!
//! The engine performs no I/O, so every failure here is a caller or
//! configuration mistake caught at call time. Gameplay outcomes (ties,
//! knockouts, series completion) are never errors.

use thiserror::Error;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum SumoError {
    #[error("unknown move distribution: {0:?}")]
    UnknownDistribution(String),

    #[error("a combatant needs at least one move distribution")]
    EmptyDistributions,

    #[error("move distribution {0:?} is declared more than once")]
    DuplicateDistribution(String),

    #[error("escalation rule for {name:?} requires {visits} edge visits (minimum is 1)")]
    InvalidThreshold { name: String, visits: u32 },

    #[error("board has not been set up")]
    NotSetUp,

    #[error("board needs at least 3 columns, got {0}")]
    TooFewColumns(usize),

    #[error("column {index} is outside a {columns}-column board")]
    ColumnOutOfRange { index: usize, columns: usize },

    #[error("series is already decided; restart the engine to play again")]
    SeriesFinished,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for SumoError {
    fn from(e: serde_json::Error) -> Self {
        SumoError::InvalidConfig(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SumoError>;
