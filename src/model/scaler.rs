// src/model/scaler.rs
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Standardizes each feature to zero mean and unit variance using statistics
/// learned from the training partition only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// Learn per-feature mean and standard deviation from `rows`.
    ///
    /// A constant feature gets a scale of 1.0 so transforming never divides
    /// by zero.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        ensure!(!rows.is_empty(), "Cannot fit scaler on an empty partition");
        let n_features = rows[0].len();
        ensure!(n_features > 0, "Cannot fit scaler on zero-width rows");

        let n = rows.len() as f64;
        let mut means = vec![0.0; n_features];
        for row in rows {
            ensure!(
                row.len() == n_features,
                "Inconsistent row width: expected {}, got {}",
                n_features,
                row.len()
            );
            for (i, value) in row.iter().enumerate() {
                means[i] += value;
            }
        }
        for mean in &mut means {
            *mean /= n;
        }

        let mut scales = vec![0.0; n_features];
        for row in rows {
            for (i, value) in row.iter().enumerate() {
                let diff = value - means[i];
                scales[i] += diff * diff;
            }
        }
        for scale in &mut scales {
            *scale = (*scale / n).sqrt();
            if *scale == 0.0 {
                *scale = 1.0;
            }
        }

        Ok(Self { means, scales })
    }

    /// Normalize a single feature vector.
    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        debug_assert_eq!(row.len(), self.means.len());
        row.iter()
            .zip(self.means.iter().zip(self.scales.iter()))
            .map(|(value, (mean, scale))| (value - mean) / scale)
            .collect()
    }

    /// Normalize a batch of rows.
    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|row| self.transform_row(row)).collect()
    }

    pub fn n_features(&self) -> usize {
        self.means.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_produces_zero_mean_unit_variance() {
        let rows = vec![
            vec![1.0, 10.0],
            vec![2.0, 20.0],
            vec![3.0, 30.0],
            vec![4.0, 40.0],
        ];
        let scaler = StandardScaler::fit(&rows).unwrap();
        let transformed = scaler.transform(&rows);

        for feature in 0..2 {
            let n = transformed.len() as f64;
            let mean: f64 = transformed.iter().map(|r| r[feature]).sum::<f64>() / n;
            let var: f64 = transformed
                .iter()
                .map(|r| (r[feature] - mean).powi(2))
                .sum::<f64>()
                / n;
            assert!(mean.abs() < 1e-12, "mean was {}", mean);
            assert!((var - 1.0).abs() < 1e-12, "variance was {}", var);
        }
    }

    #[test]
    fn test_constant_feature_does_not_divide_by_zero() {
        let rows = vec![vec![5.0, 1.0], vec![5.0, 2.0], vec![5.0, 3.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        let transformed = scaler.transform_row(&[5.0, 2.0]);
        assert_eq!(transformed[0], 0.0);
        assert!(transformed.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_transform_uses_training_statistics() {
        let rows = vec![vec![0.0], vec![10.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        // mean 5, population std 5
        assert_eq!(scaler.transform_row(&[15.0]), vec![2.0]);
    }

    #[test]
    fn test_empty_partition_is_an_error() {
        assert!(StandardScaler::fit(&[]).is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        let json = serde_json::to_string(&scaler).unwrap();
        let restored: StandardScaler = serde_json::from_str(&json).unwrap();
        assert_eq!(scaler.transform_row(&[2.0, 3.0]), restored.transform_row(&[2.0, 3.0]));
    }
}
