//! Nearest-neighbor retrieval over the latent space.
//!
//! ## Algorithm
//! 1. Fit copies the latent matrix and its ordered key list out of the
//!    feature table in one enumeration
//! 2. A query scans every row, scoring distances in parallel
//! 3. Results sort ascending by distance and truncate
//! 4. `similar_to` requests k+1 rows, drops the query movie itself, and
//!    truncates to k
//!
//! The scan is exact; the metric is fixed at fit time and is configuration,
//! not a per-query choice.

use crate::bridge::IndexBridge;
use crate::error::{Result, RetrievalError};
use crate::features::FeatureTable;
use catalog::MovieId;
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::{debug, instrument};

/// Distance metric the structure was fitted under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMetric {
    /// 1 - cosine similarity; a zero-norm vector is maximally distant
    Cosine,
    /// Straight-line distance
    Euclidean,
}

impl DistanceMetric {
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceMetric::Euclidean => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f32>()
                .sqrt(),
            DistanceMetric::Cosine => {
                let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
                let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm_a == 0.0 || norm_b == 0.0 {
                    1.0
                } else {
                    1.0 - dot / (norm_a * norm_b)
                }
            }
        }
    }
}

/// One retrieved neighbor: domain id plus its distance to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub movie_id: MovieId,
    pub distance: f32,
}

/// The fitted nearest-neighbor structure.
///
/// Owns its vectors and its own ordered key list (an embedded bridge), so a
/// later reordering of the source feature table cannot silently desync
/// positions from ids.
#[derive(Debug)]
pub struct NeighborIndex {
    bridge: IndexBridge,
    vectors: Vec<Vec<f32>>,
    metric: DistanceMetric,
}

impl NeighborIndex {
    /// Fit the index over a feature table.
    ///
    /// Vectors and key list come out of the same enumeration, which keeps
    /// position/id alignment an invariant of construction.
    pub fn fit(table: &FeatureTable, metric: DistanceMetric) -> Self {
        let bridge = IndexBridge::from_table(table);
        let vectors = table.rows().iter().map(|row| row.vector.clone()).collect();
        Self {
            bridge,
            vectors,
            metric,
        }
    }

    /// The metric the index was fitted under
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Number of fitted rows
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// The k nearest movies to `movie_id`, excluding the movie itself.
    ///
    /// Ascending by distance, at most k results (fewer when the table holds
    /// fewer than k+1 rows). Fails with `NoFeatureRow` when the movie has no
    /// vector; guessing a zero vector would return garbage neighbors.
    #[instrument(skip(self), fields(metric = ?self.metric))]
    pub fn similar_to(&self, movie_id: MovieId, k: usize) -> Result<Vec<Neighbor>> {
        let position = self
            .bridge
            .position_of(movie_id)
            .map_err(|_| RetrievalError::NoFeatureRow { id: movie_id })?;
        let query = &self.vectors[position];

        // k+1 because the query movie matches itself at distance 0
        let ranked = self.query(query, k + 1);

        let mut neighbors = Vec::with_capacity(k);
        for (pos, distance) in ranked {
            // An unmapped position here means the fitted structure and the
            // key list disagree; surface it as the configuration error it is
            let id = self.bridge.movie_id_of(pos)?;
            if id == movie_id {
                continue;
            }
            neighbors.push(Neighbor {
                movie_id: id,
                distance,
            });
            if neighbors.len() == k {
                break;
            }
        }

        debug!(
            "Retrieved {} neighbors for movie {}",
            neighbors.len(),
            movie_id
        );
        Ok(neighbors)
    }

    /// Rank all fitted rows against a raw vector.
    ///
    /// Returns at most `n` (position, distance) pairs, ascending by
    /// distance. The query row itself is not filtered here; callers that
    /// need self-exclusion go through `similar_to`.
    pub fn query(&self, vector: &[f32], n: usize) -> Vec<(usize, f32)> {
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .par_iter()
            .enumerate()
            .map(|(position, row)| (position, self.metric.distance(vector, row)))
            .collect();

        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        scored.truncate(n);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureRow;

    fn row(movie_id: MovieId, vector: &[f32]) -> FeatureRow {
        FeatureRow {
            movie_id,
            vector: vector.to_vec(),
        }
    }

    fn test_index(metric: DistanceMetric) -> NeighborIndex {
        let table = FeatureTable::from_rows(vec![
            row(1, &[0.1, 0.2]),
            row(2, &[0.1, 0.21]),
            row(3, &[0.9, 0.9]),
            row(4, &[-0.5, 0.4]),
        ])
        .unwrap();
        NeighborIndex::fit(&table, metric)
    }

    #[test]
    fn test_euclidean_distance() {
        let d = DistanceMetric::Euclidean.distance(&[0.0, 0.0], &[3.0, 4.0]);
        assert!((d - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_distance() {
        // Parallel vectors are at distance 0
        let d = DistanceMetric::Cosine.distance(&[1.0, 0.0], &[2.0, 0.0]);
        assert!(d.abs() < 1e-6);
        // Orthogonal vectors are at distance 1
        let d = DistanceMetric::Cosine.distance(&[1.0, 0.0], &[0.0, 1.0]);
        assert!((d - 1.0).abs() < 1e-6);
        // Zero-norm query is maximally distant
        let d = DistanceMetric::Cosine.distance(&[0.0, 0.0], &[1.0, 0.0]);
        assert!((d - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_similar_to_excludes_self() {
        let index = test_index(DistanceMetric::Euclidean);
        for movie_id in [1, 2, 3, 4] {
            let neighbors = index.similar_to(movie_id, 3).unwrap();
            assert!(neighbors.iter().all(|n| n.movie_id != movie_id));
        }
    }

    #[test]
    fn test_similar_to_nearest_first() {
        let index = test_index(DistanceMetric::Euclidean);
        let neighbors = index.similar_to(1, 1).unwrap();
        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].movie_id, 2);
        assert!((neighbors[0].distance - 0.01).abs() < 1e-4);
    }

    #[test]
    fn test_similar_to_returns_at_most_k() {
        let index = test_index(DistanceMetric::Euclidean);
        // Exactly k when at least k+1 rows exist
        assert_eq!(index.similar_to(1, 3).unwrap().len(), 3);
        // Fewer when the table runs out
        assert_eq!(index.similar_to(1, 10).unwrap().len(), 3);
    }

    #[test]
    fn test_results_sorted_ascending() {
        let index = test_index(DistanceMetric::Cosine);
        let neighbors = index.similar_to(1, 3).unwrap();
        for pair in neighbors.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn test_missing_feature_row_fails() {
        let index = test_index(DistanceMetric::Euclidean);
        assert!(matches!(
            index.similar_to(999, 5),
            Err(RetrievalError::NoFeatureRow { id: 999 })
        ));
    }
}
