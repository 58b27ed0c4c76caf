//! # Retrieval Crate
//!
//! The lookup-and-retrieval core over the precomputed latent space: map a
//! movie id to its feature vector, query the fitted neighbor structure,
//! translate row positions back to domain ids, predict a rating with a
//! defined fallback, and select genre-filtered picks.
//!
//! ## Components
//!
//! - **features**: the ordered latent feature table and its JSON loader
//! - **bridge**: bijective movie-id/position mapping derived from the table
//! - **neighbors**: the fitted k-nearest-neighbor structure (exact scan)
//! - **estimator**: the pre-trained factor model with its fallback chain
//! - **picker**: seeded-sample and top-rated genre selection
//! - **error**: one error type covering loading and querying
//!
//! Everything here is read-only after load; per-query results are computed
//! fresh and never cached.
//!
//! ## Example Usage
//!
//! ```ignore
//! use retrieval::{DistanceMetric, FeatureTable, NeighborIndex};
//! use std::path::Path;
//!
//! let table = FeatureTable::load_json(Path::new("models/latent.json"))?;
//! let index = NeighborIndex::fit(&table, DistanceMetric::Cosine);
//! let similar = index.similar_to(movie_id, 10)?;
//! ```

// Public modules
pub mod bridge;
pub mod error;
pub mod estimator;
pub mod features;
pub mod neighbors;
pub mod picker;

// Re-export commonly used types
pub use bridge::IndexBridge;
pub use error::{Result, RetrievalError};
pub use estimator::{FactorModel, PredictionSource, RatingEstimator, RatingPrediction};
pub use features::{FeatureRow, FeatureTable};
pub use neighbors::{DistanceMetric, Neighbor, NeighborIndex};
pub use picker::{GenrePicker, PickPolicy};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_and_bridge_agree() {
        let table = FeatureTable::from_rows(vec![
            FeatureRow {
                movie_id: 11,
                vector: vec![0.5, 0.5],
            },
            FeatureRow {
                movie_id: 22,
                vector: vec![0.6, 0.4],
            },
        ])
        .unwrap();

        let bridge = IndexBridge::from_table(&table);
        let index = NeighborIndex::fit(&table, DistanceMetric::Cosine);

        assert_eq!(index.len(), bridge.len());
        // The index's neighbor ids come back in the bridge's id space
        let neighbors = index.similar_to(11, 1).unwrap();
        assert_eq!(neighbors[0].movie_id, bridge.movie_id_of(1).unwrap());
    }
}
