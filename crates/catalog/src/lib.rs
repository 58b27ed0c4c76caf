//! # Catalog Crate
//!
//! This crate holds the movie catalog: identifier, title, external metadata
//! key, and genre tags, read once at process start and immutable afterwards.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (MovieRecord, Catalog, id aliases)
//! - **loader**: Load the catalog from a `movies.csv` export
//! - **search**: Title lookup (exact, substring, full listing)
//! - **error**: Error types for loading and lookup
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::Catalog;
//! use std::path::Path;
//!
//! let catalog = Catalog::load_csv(Path::new("data/movies.csv"))?;
//! let movie = catalog.find_by_title_substring("avatar")?;
//! println!("{} has {} genre tags", movie.title, movie.genres.len());
//! ```

// Public modules
pub mod error;
pub mod loader;
pub mod search;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{CatalogError, Result};
pub use types::{Catalog, MovieId, MovieRecord, TmdbId, UserId};
