//! Genre-filtered catalog picks.
//!
//! Two selection policies, chosen by the caller:
//! - a uniform seeded sample without replacement, reproducible per seed
//! - a ranked top-N by feature-row mean, the quality statistic the latent
//!   space reduces to
//!
//! Fewer candidates than requested is not an error; the pool is returned
//! whole, in catalog order.

use crate::bridge::IndexBridge;
use crate::features::FeatureTable;
use catalog::{Catalog, MovieRecord};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use std::sync::Arc;
use tracing::debug;

/// How `pick` selects from a genre's candidate pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickPolicy {
    /// Uniform sample without replacement, deterministic for a fixed seed
    SeededSample,
    /// Highest feature-row mean first; movies without a feature row rank
    /// last, ties keep catalog order
    TopRated,
}

pub struct GenrePicker {
    catalog: Arc<Catalog>,
    features: Arc<FeatureTable>,
    bridge: IndexBridge,
    policy: PickPolicy,
}

impl GenrePicker {
    pub fn new(catalog: Arc<Catalog>, features: Arc<FeatureTable>, policy: PickPolicy) -> Self {
        let bridge = IndexBridge::from_table(&features);
        Self {
            catalog,
            features,
            bridge,
            policy,
        }
    }

    pub fn policy(&self) -> PickPolicy {
        self.policy
    }

    /// Select up to `count` movies carrying `genre`.
    ///
    /// The seed only feeds the sampling policy; the ranked policy ignores
    /// it. An unknown genre yields an empty pool, not an error.
    pub fn pick(&self, genre: &str, count: usize, seed: u64) -> Vec<MovieRecord> {
        let pool = self.catalog.movies_with_genre(genre);
        debug!(
            "Picking {} of {} '{}' candidates via {:?}",
            count,
            pool.len(),
            genre,
            self.policy
        );

        if pool.len() <= count {
            return self.records(pool.iter().copied());
        }

        match self.policy {
            PickPolicy::SeededSample => {
                let mut rng = StdRng::seed_from_u64(seed);
                let chosen = index::sample(&mut rng, pool.len(), count);
                self.records(chosen.iter().map(|i| pool[i]))
            }
            PickPolicy::TopRated => {
                // Stable sort keeps catalog order among equal stats
                let mut ranked: Vec<_> = pool
                    .iter()
                    .map(|&id| (id, self.quality_stat(id)))
                    .collect();
                ranked.sort_by(|a, b| {
                    b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal)
                });
                ranked.truncate(count);
                self.records(ranked.into_iter().map(|(id, _)| id))
            }
        }
    }

    /// Feature-row mean, or negative infinity for a movie outside the
    /// feature space so it sorts behind every scored candidate
    fn quality_stat(&self, id: catalog::MovieId) -> f32 {
        self.bridge
            .position_of(id)
            .ok()
            .and_then(|position| self.features.get(position))
            .map(|row| row.mean())
            .unwrap_or(f32::NEG_INFINITY)
    }

    fn records(&self, ids: impl Iterator<Item = catalog::MovieId>) -> Vec<MovieRecord> {
        // The genre index only holds ids the catalog owns
        ids.filter_map(|id| self.catalog.get_movie(id).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureRow;
    use catalog::MovieId;

    fn movie(id: MovieId, title: &str, genres: &[&str]) -> MovieRecord {
        MovieRecord {
            id,
            title: title.to_string(),
            tmdb_id: None,
            genres: genres.iter().map(|g| g.to_string()).collect(),
        }
    }

    fn row(movie_id: MovieId, vector: &[f32]) -> FeatureRow {
        FeatureRow {
            movie_id,
            vector: vector.to_vec(),
        }
    }

    fn test_picker(policy: PickPolicy) -> GenrePicker {
        let mut catalog = Catalog::new();
        catalog.insert_movie(movie(1, "Mid Action", &["Action"]));
        catalog.insert_movie(movie(2, "Great Action", &["Action", "Drama"]));
        catalog.insert_movie(movie(3, "Weak Action", &["Action"]));
        catalog.insert_movie(movie(4, "Unscored Action", &["Action"]));
        catalog.insert_movie(movie(5, "Lone Drama", &["Drama"]));
        catalog.build_genre_index();

        // Movie 4 deliberately has no feature row
        let features = FeatureTable::from_rows(vec![
            row(1, &[3.0, 3.0]),
            row(2, &[4.5, 4.5]),
            row(3, &[1.0, 1.0]),
            row(5, &[4.0, 4.0]),
        ])
        .unwrap();

        GenrePicker::new(Arc::new(catalog), Arc::new(features), policy)
    }

    #[test]
    fn test_sample_is_deterministic_per_seed() {
        let picker = test_picker(PickPolicy::SeededSample);
        let first = picker.pick("Action", 2, 42);
        let second = picker.pick("Action", 2, 42);
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|m| m.has_genre("Action")));
    }

    #[test]
    fn test_ranked_orders_by_row_mean() {
        let picker = test_picker(PickPolicy::TopRated);
        let picks = picker.pick("Action", 3, 0);
        let ids: Vec<MovieId> = picks.iter().map(|m| m.id).collect();
        // Means: 2 -> 4.5, 1 -> 3.0, 3 -> 1.0, 4 -> unscored
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_unscored_movies_rank_last() {
        let picker = test_picker(PickPolicy::TopRated);
        let picks = picker.pick("Action", 4, 0);
        assert_eq!(picks.last().unwrap().id, 4);
    }

    #[test]
    fn test_small_pool_returned_whole() {
        for policy in [PickPolicy::SeededSample, PickPolicy::TopRated] {
            let picker = test_picker(policy);
            let picks = picker.pick("Drama", 10, 7);
            let ids: Vec<MovieId> = picks.iter().map(|m| m.id).collect();
            // Whole pool, catalog order, no padding
            assert_eq!(ids, vec![2, 5]);
        }
    }

    #[test]
    fn test_unknown_genre_yields_empty() {
        let picker = test_picker(PickPolicy::SeededSample);
        assert!(picker.pick("Horror", 3, 42).is_empty());
    }
}
