//! Error types for the catalog crate.

use crate::types::MovieId;
use thiserror::Error;

/// Errors that can occur while loading or querying the movie catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// I/O error occurred while reading the catalog file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV record couldn't be read or deserialized
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A catalog field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// The same movieId appeared on more than one row
    #[error("Duplicate movieId {id} at line {line}")]
    DuplicateMovie { id: MovieId, line: usize },

    /// Title lookup found no candidates
    ///
    /// Recoverable: the caller should prompt for a new query.
    #[error("No movie matches '{query}'")]
    NoMatch { query: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
