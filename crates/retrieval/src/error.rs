//! Error types for the retrieval crate.

use catalog::MovieId;
use thiserror::Error;

/// Errors that can occur while loading or querying the latent space
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// I/O error occurred while reading an artifact
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact couldn't be deserialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Movie id has no entry in the feature table
    ///
    /// Recoverable for rating prediction (the fallback path covers it) but
    /// fatal to a neighbor query for that movie.
    #[error("Movie {id} has no feature row")]
    NoFeatureRow { id: MovieId },

    /// Movie id is not part of the index bridge
    #[error("Movie {id} is not in the feature table")]
    UnknownMovie { id: MovieId },

    /// Position is outside the fitted range
    ///
    /// Indicates a mismatch between the feature table and the fitted
    /// structure. Treated as a fatal configuration error, not a
    /// per-request condition.
    #[error("Position {position} is outside the index range (len {len})")]
    OutOfRange { position: usize, len: usize },

    /// A feature row's vector length disagrees with the table
    #[error("Feature row for movie {id} has {found} dimensions, expected {expected}")]
    DimensionMismatch {
        id: MovieId,
        expected: usize,
        found: usize,
    },

    /// The same movieId appeared on more than one feature row
    #[error("Feature table contains duplicate movie {id}")]
    DuplicateRow { id: MovieId },

    /// The feature table has no rows
    #[error("Feature table is empty")]
    EmptyTable,
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, RetrievalError>;
