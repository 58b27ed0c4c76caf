//! The recommendation query chain.
//!
//! One synchronous path per interaction: resolve the title, predict a
//! rating, retrieve similar movies from the latent space, translate
//! positions back to catalog entries, and assemble genre shelves. All
//! state is constructed once at process start from the loaded artifacts
//! and injected here; nothing is cached per query.

use catalog::{Catalog, CatalogError, MovieRecord, UserId};
use retrieval::{
    DistanceMetric, FactorModel, FeatureTable, GenrePicker, NeighborIndex, PickPolicy,
    RatingEstimator, RatingPrediction, RetrievalError,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Errors surfaced by the query chain
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Where the offline-training artifacts live
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub movies_csv: PathBuf,
    pub latent_json: PathBuf,
    pub model_json: PathBuf,
}

/// Parameters of one recommendation query
#[derive(Debug, Clone)]
pub struct RecommendRequest {
    pub title_query: String,
    pub user_id: UserId,
    pub similar_count: usize,
    pub per_genre: usize,
    /// How many of the movie's genre tags get a shelf
    pub genre_limit: usize,
    pub seed: u64,
}

impl RecommendRequest {
    /// Defaults match the interactive surface: anonymous subject 1000,
    /// ten similar titles, three shelves of five, seed 42.
    pub fn new(title_query: impl Into<String>) -> Self {
        Self {
            title_query: title_query.into(),
            user_id: 1000,
            similar_count: 10,
            per_genre: 5,
            genre_limit: 3,
            seed: 42,
        }
    }
}

/// A similar movie resolved back to its catalog entry
#[derive(Debug, Clone)]
pub struct SimilarMovie {
    pub movie: MovieRecord,
    pub distance: f32,
}

/// One genre shelf of picks
#[derive(Debug, Clone)]
pub struct GenreShelf {
    pub genre: String,
    pub picks: Vec<MovieRecord>,
}

/// Everything one interaction displays
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub movie: MovieRecord,
    pub rating: RatingPrediction,
    pub similar: Vec<SimilarMovie>,
    pub shelves: Vec<GenreShelf>,
}

/// The assembled read-only query state.
pub struct Recommender {
    catalog: Arc<Catalog>,
    neighbors: NeighborIndex,
    estimator: RatingEstimator,
    picker: GenrePicker,
}

impl Recommender {
    /// Wire the components from already-loaded parts.
    pub fn new(
        catalog: Catalog,
        features: FeatureTable,
        model: FactorModel,
        metric: DistanceMetric,
        policy: PickPolicy,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let features = Arc::new(features);
        let neighbors = NeighborIndex::fit(&features, metric);
        let estimator = RatingEstimator::new(model, Arc::clone(&features));
        let picker = GenrePicker::new(Arc::clone(&catalog), Arc::clone(&features), policy);

        Self {
            catalog,
            neighbors,
            estimator,
            picker,
        }
    }

    /// Load all artifacts and wire the components.
    pub fn from_artifacts(
        paths: &ArtifactPaths,
        metric: DistanceMetric,
        policy: PickPolicy,
    ) -> Result<Self> {
        let start = Instant::now();

        let catalog = Catalog::load_csv(&paths.movies_csv)?;
        let features = FeatureTable::load_json(&paths.latent_json)?;
        let model = FactorModel::load_json(&paths.model_json)?;

        info!(
            "Loaded artifacts in {:?} ({} movies, {} feature rows)",
            start.elapsed(),
            catalog.len(),
            features.len()
        );
        Ok(Self::new(catalog, features, model, metric, policy))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Resolve a title query to its catalog entry (first substring match)
    pub fn lookup(&self, query: &str) -> Result<&MovieRecord> {
        Ok(self.catalog.find_by_title_substring(query)?)
    }

    /// Predict a rating for a (user, movie) pair; total, never fails
    pub fn predict_for(&self, user_id: UserId, movie_id: catalog::MovieId) -> RatingPrediction {
        self.estimator.predict(user_id, movie_id)
    }

    /// The k movies closest to `movie_id`, resolved to catalog entries.
    ///
    /// A neighbor the catalog does not know is skipped with a warning; the
    /// feature space and the catalog are allowed to diverge, and a shelf of
    /// display data is not the place to enforce integrity. The result may
    /// then hold fewer than k entries.
    pub fn similar_to(&self, movie_id: catalog::MovieId, k: usize) -> Result<Vec<SimilarMovie>> {
        let neighbors = self.neighbors.similar_to(movie_id, k)?;

        let mut similar = Vec::with_capacity(neighbors.len());
        for neighbor in neighbors {
            match self.catalog.get_movie(neighbor.movie_id) {
                Some(movie) => similar.push(SimilarMovie {
                    movie: movie.clone(),
                    distance: neighbor.distance,
                }),
                None => warn!(
                    "Neighbor {} is in the feature space but not the catalog; skipping",
                    neighbor.movie_id
                ),
            }
        }
        Ok(similar)
    }

    /// Run the full query chain for one interaction.
    #[instrument(skip(self, request), fields(title = %request.title_query))]
    pub fn recommend(&self, request: &RecommendRequest) -> Result<Recommendation> {
        let start = Instant::now();

        // 1. Resolve the title to one catalog entry
        let movie = self.lookup(&request.title_query)?.clone();

        // 2. Predict a rating (total; fallback covers movies the model misses)
        let rating = self.estimator.predict(request.user_id, movie.id);

        // 3. Similar titles from the latent space, translated back to ids
        let similar = self.similar_to(movie.id, request.similar_count)?;

        // 4. One shelf per genre tag, capped
        let shelves = movie
            .genres
            .iter()
            .take(request.genre_limit)
            .map(|genre| GenreShelf {
                genre: genre.clone(),
                picks: self.picker.pick(genre, request.per_genre, request.seed),
            })
            .collect();

        info!(
            "Recommendation for '{}' ({} similar) in {:?}",
            movie.title,
            similar.len(),
            start.elapsed()
        );
        Ok(Recommendation {
            movie,
            rating,
            similar,
            shelves,
        })
    }
}
