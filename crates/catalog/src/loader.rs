//! CSV loader for the movie catalog.
//!
//! Expected header: `movieId,title,tmdbId,genres`
//! - `tmdbId` may be empty (nullable)
//! - `genres` is pipe-delimited; the literal `(no genres listed)` means the
//!   movie has no genre tags

use crate::error::{CatalogError, Result};
use crate::types::{Catalog, MovieId, MovieRecord, TmdbId};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Raw shape of one CSV row, before genre splitting
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    title: String,
    #[serde(rename = "tmdbId")]
    tmdb_id: Option<TmdbId>,
    genres: String,
}

/// Sentinel the MovieLens export uses for an untagged movie
const NO_GENRES: &str = "(no genres listed)";

impl Catalog {
    /// Load the catalog from a CSV file.
    ///
    /// The catalog is read once at process start and immutable afterwards.
    /// A duplicate `movieId` is a load error rather than a silent overwrite.
    pub fn load_csv(path: &Path) -> Result<Self> {
        info!("Loading movie catalog from {}", path.display());

        let mut reader = csv::Reader::from_path(path)?;
        let mut catalog = Catalog::new();

        for (idx, row) in reader.deserialize().enumerate() {
            // Header is line 1, first record line 2
            let line = idx + 2;
            let row: CsvRow = row?;

            let record = MovieRecord {
                id: row.movie_id,
                title: row.title,
                tmdb_id: row.tmdb_id,
                genres: parse_genres(&row.genres),
            };

            if !catalog.insert_movie(record) {
                return Err(CatalogError::DuplicateMovie {
                    id: row.movie_id,
                    line,
                });
            }
        }

        catalog.build_genre_index();

        info!(
            "Loaded {} movies across {} genre tags",
            catalog.len(),
            catalog.genre_index.len()
        );
        Ok(catalog)
    }
}

/// Parse pipe-separated genre tags
fn parse_genres(s: &str) -> Vec<String> {
    if s.is_empty() || s == NO_GENRES {
        return Vec::new();
    }
    s.split('|')
        .filter(|g| !g.is_empty())
        .map(|g| g.to_string())
        .collect()
}
