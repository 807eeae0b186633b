// src/model/forest.rs
use anyhow::{ensure, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::tree::{DecisionTree, TreeParams};

/// Frozen ensemble hyperparameters. These are not configurable at runtime;
/// the defaults are the only configuration the service ever trains with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 5,
            min_samples_leaf: 2,
            seed: 42,
        }
    }
}

/// A bagged ensemble of CART trees with averaged probability votes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    n_features: usize,
    trees: Vec<DecisionTree>,
    feature_importances: Vec<f64>,
}

impl RandomForest {
    /// Fit the ensemble. Each tree gets its own bootstrap sample and a
    /// deterministic RNG derived from the master seed, so the same inputs
    /// always produce the same forest.
    pub fn fit(features: &[Vec<f64>], labels: &[u8], params: ForestParams) -> Result<Self> {
        ensure!(!features.is_empty(), "Cannot fit forest on an empty partition");
        ensure!(
            features.len() == labels.len(),
            "Feature/label length mismatch: {} vs {}",
            features.len(),
            labels.len()
        );
        ensure!(params.n_trees > 0, "Forest needs at least one tree");

        let n_rows = features.len();
        let n_features = features[0].len();
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            min_samples_leaf: params.min_samples_leaf,
            max_features: ((n_features as f64).sqrt().floor() as usize).max(1),
        };

        let mut trees = Vec::with_capacity(params.n_trees);
        let mut importances = vec![0.0; n_features];
        for tree_index in 0..params.n_trees {
            let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(tree_index as u64));
            let sample: Vec<usize> = (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect();
            trees.push(DecisionTree::fit(
                features,
                labels,
                &sample,
                tree_params,
                &mut rng,
                &mut importances,
            ));
        }

        // Normalize so the global importances sum to 1.
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for value in &mut importances {
                *value /= total;
            }
        }

        Ok(Self {
            params,
            n_features,
            trees,
            feature_importances: importances,
        })
    }

    /// Probability of the positive class: the mean of the per-tree leaf
    /// fractions, matching how a probability-averaging ensemble votes.
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        debug_assert_eq!(row.len(), self.n_features);
        let sum: f64 = self.trees.iter().map(|tree| tree.predict_proba(row)).sum();
        sum / self.trees.len() as f64
    }

    pub fn predict(&self, row: &[f64]) -> u8 {
        (self.predict_proba(row) >= 0.5) as u8
    }

    /// Global per-feature importance (mean decrease in impurity), normalized
    /// to sum to 1 when any split occurred.
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }
}
