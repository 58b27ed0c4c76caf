//! # Engine Crate
//!
//! Wires the catalog and the retrieval core into the per-interaction query
//! chain: title -> feature row -> rating prediction + nearest neighbors ->
//! catalog entries -> genre shelves.
//!
//! The engine is synchronous and single-threaded by design: each
//! interaction is one blocking call chain over state that is immutable
//! after process start, so concurrent readers need no locking and nothing
//! here suspends.

pub mod recommender;

pub use recommender::{
    ArtifactPaths, EngineError, GenreShelf, Recommendation, RecommendRequest, Recommender,
    Result, SimilarMovie,
};
