//! Error types for the table API

use thiserror::Error;

use crate::api::types::BallNumber;

/// Errors surfaced by [`PoolTable`](crate::table::PoolTable) operations.
///
/// Steady-state simulation never fails; these only come back from calls made
/// by collaborators (shots, snapshots, remote tuning).
#[derive(Debug, Error)]
pub enum TableError {
    /// Parameter or snapshot JSON could not be parsed
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Parameter JSON was valid but not an object of key/value pairs
    #[error("Expected a JSON object of parameters")]
    NotAnObject,

    /// No ball with this number is racked
    #[error("Unknown ball number: {0}")]
    UnknownBall(BallNumber),

    /// A shot was requested while the cue ball is parked in a pocket
    #[error("Cue ball is pocketed and must be respotted first")]
    CueBallPocketed,

    /// Shot direction has no horizontal component
    #[error("Shot direction has no horizontal component")]
    DegenerateDirection,
}

/// Result type for table operations
pub type Result<T> = std::result::Result<T, TableError>;
