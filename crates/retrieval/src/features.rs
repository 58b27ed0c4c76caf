//! The latent feature table.
//!
//! One fixed-length numeric vector per movie, produced offline (learned
//! latent factors or hand-engineered statistics). The stored row order is
//! significant: it is the order the neighbor structure was fitted on, and
//! the index bridge assigns positions by enumerating it.

use crate::error::{Result, RetrievalError};
use catalog::MovieId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// One movie's vector in the similarity/prediction space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    #[serde(rename = "movieId")]
    pub movie_id: MovieId,
    pub vector: Vec<f32>,
}

impl FeatureRow {
    /// Mean of the vector components.
    ///
    /// NaN for an empty vector; `FeatureTable` validation rules that out
    /// for loaded tables.
    pub fn mean(&self) -> f32 {
        if self.vector.is_empty() {
            return f32::NAN;
        }
        self.vector.iter().sum::<f32>() / self.vector.len() as f32
    }
}

/// The ordered store of feature rows.
///
/// Read-only after load. Not every catalog movie has a row here, and not
/// every row is necessarily in the catalog; consumers handle the divergence.
#[derive(Debug)]
pub struct FeatureTable {
    rows: Vec<FeatureRow>,
    dimension: usize,
}

impl FeatureTable {
    /// Build a table from rows, validating shape.
    ///
    /// Fails on an empty table, a duplicate movie id, or a vector whose
    /// length disagrees with the first row's.
    pub fn from_rows(rows: Vec<FeatureRow>) -> Result<Self> {
        let dimension = match rows.first() {
            Some(row) => row.vector.len(),
            None => return Err(RetrievalError::EmptyTable),
        };

        let mut seen = HashSet::with_capacity(rows.len());
        for row in &rows {
            if row.vector.len() != dimension {
                return Err(RetrievalError::DimensionMismatch {
                    id: row.movie_id,
                    expected: dimension,
                    found: row.vector.len(),
                });
            }
            if !seen.insert(row.movie_id) {
                return Err(RetrievalError::DuplicateRow { id: row.movie_id });
            }
        }

        Ok(Self { rows, dimension })
    }

    /// Load the table from a JSON array of rows.
    ///
    /// Array order is preserved verbatim; it must match the order the
    /// neighbor structure was fitted on.
    pub fn load_json(path: &Path) -> Result<Self> {
        info!("Loading feature table from {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        let rows: Vec<FeatureRow> = serde_json::from_reader(reader)?;
        let table = Self::from_rows(rows)?;
        info!(
            "Loaded {} feature rows of dimension {}",
            table.len(),
            table.dimension()
        );
        Ok(table)
    }

    /// Rows in stored order
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// Row at a given position
    pub fn get(&self, position: usize) -> Option<&FeatureRow> {
        self.rows.get(position)
    }

    /// Shared vector length of every row
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
