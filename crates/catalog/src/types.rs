//! Core domain types for the movie catalog.
//!
//! This module defines the catalog's data structures:
//! - Type aliases for domain clarity (MovieId, UserId, TmdbId)
//! - MovieRecord, the immutable per-movie row
//! - Catalog, the in-memory store with its secondary genre index

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================
// These make the domain clearer and prevent mixing up the three ID spaces

/// Unique identifier for a movie (primary key of the catalog)
pub type MovieId = u32;

/// Unique identifier for a rating subject (a user of the trained estimator)
pub type UserId = u32;

/// Key into the external TMDb metadata gateway
pub type TmdbId = u32;

// =============================================================================
// Movie Record
// =============================================================================

/// One row of the movie catalog.
///
/// Immutable after load. `tmdb_id` is nullable: not every catalog entry has
/// an external metadata key. Genres are open string tags; an empty vector
/// means the source row carried no genre tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: MovieId,
    pub title: String,
    pub tmdb_id: Option<TmdbId>,
    pub genres: Vec<String>,
}

impl MovieRecord {
    /// Whether this movie carries the given genre tag (exact match)
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }
}

// =============================================================================
// Catalog - The In-Memory Movie Store
// =============================================================================

/// The loaded movie catalog.
///
/// Read-only after load. Lookups by id are O(1); title searches scan in
/// catalog file order, which is preserved so that "first match" and the
/// genre index ordering are deterministic across runs.
#[derive(Debug, Default)]
pub struct Catalog {
    /// Primary store
    pub(crate) movies: HashMap<MovieId, MovieRecord>,

    /// Movie ids in catalog file order
    pub(crate) order: Vec<MovieId>,

    /// Movies grouped by genre tag, each list in catalog file order
    pub(crate) genre_index: HashMap<String, Vec<MovieId>>,
}

impl Catalog {
    /// Creates a new, empty Catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a movie by ID
    pub fn get_movie(&self, id: MovieId) -> Option<&MovieRecord> {
        self.movies.get(&id)
    }

    /// Get all movies carrying a genre tag, in catalog file order
    ///
    /// Returns an empty slice for an unknown tag.
    pub fn movies_with_genre(&self, genre: &str) -> &[MovieId] {
        self.genre_index
            .get(genre)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate over all movies in catalog file order
    pub fn iter(&self) -> impl Iterator<Item = &MovieRecord> {
        self.order.iter().filter_map(|id| self.movies.get(id))
    }

    /// Number of movies in the catalog
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // Mutators - used during catalog load only; the loaded catalog is
    // treated as immutable for the process lifetime.

    /// Insert a movie, keeping insertion order
    ///
    /// Returns false (and leaves the catalog unchanged) if the id is
    /// already present.
    pub fn insert_movie(&mut self, movie: MovieRecord) -> bool {
        if self.movies.contains_key(&movie.id) {
            return false;
        }
        self.order.push(movie.id);
        self.movies.insert(movie.id, movie);
        true
    }

    /// Build the genre index after all movies are inserted
    ///
    /// Walks `order` rather than the primary map so each per-genre list
    /// comes out in catalog file order.
    pub fn build_genre_index(&mut self) {
        self.genre_index.clear();
        for id in &self.order {
            if let Some(movie) = self.movies.get(id) {
                for genre in &movie.genres {
                    self.genre_index
                        .entry(genre.clone())
                        .or_insert_with(Vec::new)
                        .push(*id);
                }
            }
        }
    }
}
