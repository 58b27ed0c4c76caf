//! Rating prediction over the pre-trained factor model.
//!
//! The model artifact is produced by offline training; this module only
//! loads and queries it. Prediction is a total function: a model miss falls
//! back to the movie's feature-row mean, and a movie with no feature row
//! falls back to NaN. Both fallbacks carry a provenance tag so the caller
//! can tell which path produced the number.

use crate::bridge::IndexBridge;
use crate::error::Result;
use crate::features::FeatureTable;
use catalog::{MovieId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Which code path produced a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionSource {
    /// The trained factor model scored the (user, movie) pair
    Model,
    /// The model missed; the value is the movie's feature-row mean, or NaN
    /// when the movie has no feature row either
    Fallback,
}

/// A predicted rating plus its provenance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingPrediction {
    pub value: f32,
    pub source: PredictionSource,
}

/// Serialized matrix-factorization estimator.
///
/// Score for a covered pair is `global_mean + b_u + b_i + p_u . q_i`. A pair
/// is covered only when both biases exist; the factor dot product
/// contributes when both factor vectors exist.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FactorModel {
    pub global_mean: f32,
    #[serde(default)]
    pub user_biases: HashMap<UserId, f32>,
    #[serde(default)]
    pub item_biases: HashMap<MovieId, f32>,
    #[serde(default)]
    pub user_factors: HashMap<UserId, Vec<f32>>,
    #[serde(default)]
    pub item_factors: HashMap<MovieId, Vec<f32>>,
}

impl FactorModel {
    /// Load the model from its JSON artifact
    pub fn load_json(path: &Path) -> Result<Self> {
        info!("Loading factor model from {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        let model: FactorModel = serde_json::from_reader(reader)?;
        info!(
            "Loaded factor model covering {} users and {} movies",
            model.user_biases.len(),
            model.item_biases.len()
        );
        Ok(model)
    }

    /// Raw model score, or None when the model does not cover the pair
    pub fn score(&self, user_id: UserId, movie_id: MovieId) -> Option<f32> {
        let user_bias = self.user_biases.get(&user_id)?;
        let item_bias = self.item_biases.get(&movie_id)?;

        let dot = match (
            self.user_factors.get(&user_id),
            self.item_factors.get(&movie_id),
        ) {
            (Some(p), Some(q)) => p.iter().zip(q).map(|(x, y)| x * y).sum(),
            _ => 0.0,
        };

        Some(self.global_mean + user_bias + item_bias + dot)
    }
}

/// Wraps the factor model with the documented fallback chain.
#[derive(Debug)]
pub struct RatingEstimator {
    model: FactorModel,
    features: Arc<FeatureTable>,
    bridge: IndexBridge,
}

impl RatingEstimator {
    pub fn new(model: FactorModel, features: Arc<FeatureTable>) -> Self {
        let bridge = IndexBridge::from_table(&features);
        Self {
            model,
            features,
            bridge,
        }
    }

    /// Predict a rating for a (user, movie) pair.
    ///
    /// Total: never fails, for any pair, including movies absent from both
    /// the model and the feature table. The NaN sentinel on the last rung
    /// keeps the display layer supplied with *something* rather than an
    /// error. No bound is enforced on the model value.
    pub fn predict(&self, user_id: UserId, movie_id: MovieId) -> RatingPrediction {
        if let Some(value) = self.model.score(user_id, movie_id) {
            return RatingPrediction {
                value,
                source: PredictionSource::Model,
            };
        }

        debug!(
            "Factor model does not cover (user {}, movie {}); using feature-row fallback",
            user_id, movie_id
        );
        let value = self
            .bridge
            .position_of(movie_id)
            .ok()
            .and_then(|position| self.features.get(position))
            .map(|row| row.mean())
            .unwrap_or(f32::NAN);

        RatingPrediction {
            value,
            source: PredictionSource::Fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureRow;

    fn test_features() -> Arc<FeatureTable> {
        Arc::new(
            FeatureTable::from_rows(vec![
                FeatureRow {
                    movie_id: 1,
                    vector: vec![3.0, 4.0],
                },
                FeatureRow {
                    movie_id: 2,
                    vector: vec![2.0, 2.0],
                },
            ])
            .unwrap(),
        )
    }

    fn test_model() -> FactorModel {
        FactorModel {
            global_mean: 3.5,
            user_biases: HashMap::from([(10, 0.2)]),
            item_biases: HashMap::from([(1, 0.3)]),
            user_factors: HashMap::from([(10, vec![1.0, 0.5])]),
            item_factors: HashMap::from([(1, vec![0.4, 0.2])]),
        }
    }

    #[test]
    fn test_model_score_covered_pair() {
        let model = test_model();
        // 3.5 + 0.2 + 0.3 + (1.0*0.4 + 0.5*0.2) = 4.5
        let score = model.score(10, 1).unwrap();
        assert!((score - 4.5).abs() < 1e-6);
    }

    #[test]
    fn test_model_score_misses() {
        let model = test_model();
        assert!(model.score(99, 1).is_none()); // unknown user
        assert!(model.score(10, 2).is_none()); // unknown movie
    }

    #[test]
    fn test_predict_model_path() {
        let estimator = RatingEstimator::new(test_model(), test_features());
        let prediction = estimator.predict(10, 1);
        assert_eq!(prediction.source, PredictionSource::Model);
        assert!((prediction.value - 4.5).abs() < 1e-6);
    }

    #[test]
    fn test_predict_falls_back_to_row_mean() {
        let estimator = RatingEstimator::new(test_model(), test_features());
        // Movie 2 is outside the model but has a feature row
        let prediction = estimator.predict(10, 2);
        assert_eq!(prediction.source, PredictionSource::Fallback);
        assert!((prediction.value - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_predict_never_fails() {
        let estimator = RatingEstimator::new(test_model(), test_features());
        // No model entry and no feature row: NaN sentinel, still a prediction
        let prediction = estimator.predict(99, 999);
        assert_eq!(prediction.source, PredictionSource::Fallback);
        assert!(prediction.value.is_nan());
    }

    #[test]
    fn test_model_json_roundtrip() {
        let json = serde_json::to_string(&test_model()).unwrap();
        let model: FactorModel = serde_json::from_str(&json).unwrap();
        assert!((model.score(10, 1).unwrap() - 4.5).abs() < 1e-6);
    }
}
