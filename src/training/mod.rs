// src/training/mod.rs
use anyhow::{ensure, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::dataset::{Dataset, FEATURE_NAMES};
use crate::model::metrics::{accuracy, classification_report};
use crate::model::{ForestParams, RandomForest, StandardScaler};

/// Held-out fraction of the dataset. Fixed, like the hyperparameters.
pub const TEST_FRACTION: f64 = 0.2;

/// Everything a training run produces. The caller (model store or training
/// binary) is responsible for persisting the pair.
#[derive(Debug, Clone)]
pub struct TrainedArtifacts {
    pub model: RandomForest,
    pub scaler: StandardScaler,
    pub held_out_accuracy: f64,
    pub trained_at: DateTime<Utc>,
}

/// Deterministic shuffled partition of `0..n_rows` into (train, test) index
/// sets. The same seed yields the same permutation on every run.
pub fn train_test_split(n_rows: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    // Keep at least one training row.
    let test_len = ((n_rows as f64 * test_fraction).round() as usize).min(n_rows.saturating_sub(1));
    let train = indices.split_off(test_len);
    (train, indices)
}

/// Fit the scaler and forest on the training partition and evaluate on the
/// held-out partition. Scaling statistics come from the training rows only,
/// so nothing leaks from the test set.
pub fn train(dataset: &Dataset, params: ForestParams) -> Result<TrainedArtifacts> {
    ensure!(!dataset.is_empty(), "Cannot train on an empty dataset");

    let (train_idx, test_idx) = train_test_split(dataset.len(), TEST_FRACTION, params.seed);
    info!(
        "Training on {} rows, evaluating on {} held-out rows",
        train_idx.len(),
        test_idx.len()
    );

    let gather = |indices: &[usize]| -> (Vec<Vec<f64>>, Vec<u8>) {
        (
            indices.iter().map(|&i| dataset.features[i].clone()).collect(),
            indices.iter().map(|&i| dataset.labels[i]).collect(),
        )
    };
    let (train_rows, train_labels) = gather(&train_idx);
    let (test_rows, test_labels) = gather(&test_idx);

    let scaler = StandardScaler::fit(&train_rows)?;
    let train_scaled = scaler.transform(&train_rows);
    let test_scaled = scaler.transform(&test_rows);

    let model = RandomForest::fit(&train_scaled, &train_labels, params)?;

    let held_out_accuracy = if test_labels.is_empty() {
        warn!("Held-out partition is empty; skipping evaluation");
        0.0
    } else {
        let predicted: Vec<u8> = test_scaled.iter().map(|row| model.predict(row)).collect();
        let acc = accuracy(&test_labels, &predicted);
        info!("Model Accuracy: {:.2}", acc);
        info!(
            "Classification Report:\n{}",
            classification_report(&test_labels, &predicted)
        );
        acc
    };

    log_feature_importance(&model);

    Ok(TrainedArtifacts {
        model,
        scaler,
        held_out_accuracy,
        trained_at: Utc::now(),
    })
}

/// Log the global importance ranking, most important feature first.
fn log_feature_importance(model: &RandomForest) {
    let mut ranked: Vec<(&str, f64)> = FEATURE_NAMES
        .iter()
        .copied()
        .zip(model.feature_importances().iter().copied())
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let formatted: Vec<String> = ranked
        .iter()
        .map(|(name, importance)| format!("{}: {:.4}", name, importance))
        .collect();
    info!("Feature Importance: {}", formatted.join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn synthetic_dataset(n: usize) -> Dataset {
        // 13 features; thalach (index 7) separates the classes.
        let mut dataset = Dataset::default();
        for i in 0..n {
            let label = (i % 2) as u8;
            let mut row = vec![0.0; FEATURE_NAMES.len()];
            row[0] = 40.0 + (i % 30) as f64; // age
            row[4] = 200.0 + (i % 80) as f64; // chol
            row[7] = if label == 1 {
                160.0 + (i % 20) as f64
            } else {
                100.0 + (i % 20) as f64
            };
            row[9] = (i % 4) as f64 * 0.5; // oldpeak
            dataset.features.push(row);
            dataset.labels.push(label);
        }
        dataset
    }

    #[test]
    fn test_split_is_deterministic() {
        let (train_a, test_a) = train_test_split(100, TEST_FRACTION, 42);
        let (train_b, test_b) = train_test_split(100, TEST_FRACTION, 42);
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);
    }

    #[test]
    fn test_split_proportions_and_coverage() {
        let (train, test) = train_test_split(100, TEST_FRACTION, 42);
        assert_eq!(test.len(), 20);
        assert_eq!(train.len(), 80);

        let all: HashSet<usize> = train.iter().chain(test.iter()).copied().collect();
        assert_eq!(all.len(), 100);
    }

    #[test]
    fn test_different_seed_changes_split() {
        let (train_a, _) = train_test_split(100, TEST_FRACTION, 42);
        let (train_b, _) = train_test_split(100, TEST_FRACTION, 43);
        assert_ne!(train_a, train_b);
    }

    #[test]
    fn test_split_keeps_a_training_row() {
        let (train, test) = train_test_split(2, 0.9, 42);
        assert_eq!(train.len(), 1);
        assert_eq!(test.len(), 1);
    }

    #[test]
    fn test_training_is_reproducible() {
        let dataset = synthetic_dataset(50);
        let params = ForestParams {
            n_trees: 15,
            ..ForestParams::default()
        };
        let a = train(&dataset, params).unwrap();
        let b = train(&dataset, params).unwrap();

        let probe = vec![50.0, 0.0, 0.0, 0.0, 230.0, 0.0, 0.0, 150.0, 0.0, 1.0, 0.0, 0.0, 0.0];
        let scaled_a = a.scaler.transform_row(&probe);
        let scaled_b = b.scaler.transform_row(&probe);
        assert_eq!(scaled_a, scaled_b);
        assert_eq!(a.model.predict_proba(&scaled_a), b.model.predict_proba(&scaled_b));
        assert_eq!(a.held_out_accuracy, b.held_out_accuracy);
    }

    #[test]
    fn test_training_learns_the_signal() {
        let dataset = synthetic_dataset(60);
        let params = ForestParams {
            n_trees: 25,
            ..ForestParams::default()
        };
        let artifacts = train(&dataset, params).unwrap();
        assert!(
            artifacts.held_out_accuracy > 0.8,
            "accuracy was {}",
            artifacts.held_out_accuracy
        );

        // thalach carries the signal.
        let importances = artifacts.model.feature_importances();
        let max_index = importances
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(FEATURE_NAMES[max_index], "thalach");
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        assert!(train(&Dataset::default(), ForestParams::default()).is_err());
    }
}
