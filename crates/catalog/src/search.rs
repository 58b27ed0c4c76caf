//! Title lookup over the loaded catalog.
//!
//! All lookups are pure reads over immutable state. "First match" always
//! means first in catalog file order.

use crate::error::{CatalogError, Result};
use crate::types::{Catalog, MovieRecord};

impl Catalog {
    /// Find the first movie whose title contains `query`, case-insensitively.
    ///
    /// Fails with `NoMatch` if no title contains the query.
    pub fn find_by_title_substring(&self, query: &str) -> Result<&MovieRecord> {
        let needle = query.to_lowercase();
        self.iter()
            .find(|movie| movie.title.to_lowercase().contains(&needle))
            .ok_or_else(|| CatalogError::NoMatch {
                query: query.to_string(),
            })
    }

    /// Find the movie whose title equals `query` exactly.
    ///
    /// Fails with `NoMatch` if no title matches.
    pub fn find_by_exact_title(&self, query: &str) -> Result<&MovieRecord> {
        self.iter()
            .find(|movie| movie.title == query)
            .ok_or_else(|| CatalogError::NoMatch {
                query: query.to_string(),
            })
    }

    /// All movies whose titles contain `query` case-insensitively, in
    /// catalog file order.
    pub fn search_by_title(&self, query: &str) -> Vec<&MovieRecord> {
        let needle = query.to_lowercase();
        self.iter()
            .filter(|movie| movie.title.to_lowercase().contains(&needle))
            .collect()
    }
}
