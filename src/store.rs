// src/store.rs
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::RwLock;

use crate::config::ServiceConfig;
use crate::dataset::load_dataset;
use crate::model::{ForestParams, RandomForest, StandardScaler};
use crate::training::{self, TrainedArtifacts};

/// The persisted model artifact: the fitted forest plus training metadata.
/// The scaler is persisted separately, but the two files are always written
/// and read together as a pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredModel {
    pub model: RandomForest,
    pub trained_at: DateTime<Utc>,
    pub held_out_accuracy: f64,
}

#[derive(Clone)]
struct CachedPair {
    model: Arc<StoredModel>,
    scaler: Arc<StandardScaler>,
    model_mtime: SystemTime,
    scaler_mtime: SystemTime,
}

/// Loads, trains, persists, and caches the (model, scaler) artifact pair.
///
/// Artifacts are cached in-process keyed on both files' modification times:
/// a request always reflects the latest persisted pair, but repeated requests
/// do not re-read (or worse, re-train) anything while the files are unchanged.
pub struct ModelStore {
    config: ServiceConfig,
    cache: RwLock<Option<CachedPair>>,
}

impl ModelStore {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            cache: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Return the current artifact pair, deserializing it from disk or, on
    /// any load failure (missing, corrupt, incompatible), retraining from the
    /// dataset. Retraining persists fresh artifacts before this returns.
    /// All-or-nothing: a pair is never mixed across sources.
    pub async fn load_or_train(&self) -> Result<(Arc<StoredModel>, Arc<StandardScaler>)> {
        let mtimes = self.artifact_mtimes();

        if let Some(pair) = self.cache.read().await.as_ref() {
            if Some((pair.model_mtime, pair.scaler_mtime)) == mtimes {
                return Ok((Arc::clone(&pair.model), Arc::clone(&pair.scaler)));
            }
        }

        let mut cache = self.cache.write().await;
        // Another request may have refreshed the cache while we waited.
        let mtimes = self.artifact_mtimes();
        if let Some(pair) = cache.as_ref() {
            if Some((pair.model_mtime, pair.scaler_mtime)) == mtimes {
                return Ok((Arc::clone(&pair.model), Arc::clone(&pair.scaler)));
            }
        }

        let (model, scaler) = match self.load_pair() {
            Ok(pair) => {
                info!("Successfully loaded existing model and scaler");
                pair
            }
            Err(e) => {
                info!("Training new model as existing model not found: {:#}", e);
                self.train_and_persist()?
            }
        };

        let model = Arc::new(model);
        let scaler = Arc::new(scaler);
        match self.artifact_mtimes() {
            Some((model_mtime, scaler_mtime)) => {
                *cache = Some(CachedPair {
                    model: Arc::clone(&model),
                    scaler: Arc::clone(&scaler),
                    model_mtime,
                    scaler_mtime,
                });
            }
            None => {
                // Files vanished between persist and stat; serve this pair
                // without caching it.
                warn!("Artifact files not statable after load; skipping cache");
                *cache = None;
            }
        }

        Ok((model, scaler))
    }

    /// Train on the configured dataset and write both artifacts to disk.
    /// Dataset failures are fatal here; there is no recovery path.
    pub fn train_and_persist(&self) -> Result<(StoredModel, StandardScaler)> {
        let dataset = load_dataset(&self.config.dataset_path)?;
        let artifacts = training::train(&dataset, ForestParams::default())?;
        self.persist(&artifacts)?;
        Ok((
            StoredModel {
                model: artifacts.model,
                trained_at: artifacts.trained_at,
                held_out_accuracy: artifacts.held_out_accuracy,
            },
            artifacts.scaler,
        ))
    }

    /// Serialize the pair to the configured paths.
    pub fn persist(&self, artifacts: &TrainedArtifacts) -> Result<()> {
        let stored = StoredModel {
            model: artifacts.model.clone(),
            trained_at: artifacts.trained_at,
            held_out_accuracy: artifacts.held_out_accuracy,
        };
        write_json(&self.config.model_path, &stored)?;
        write_json(&self.config.scaler_path, &artifacts.scaler)?;
        info!(
            "Persisted model to {} and scaler to {}",
            self.config.model_path.display(),
            self.config.scaler_path.display()
        );
        Ok(())
    }

    fn load_pair(&self) -> Result<(StoredModel, StandardScaler)> {
        let model: StoredModel = read_json(&self.config.model_path)?;
        let scaler: StandardScaler = read_json(&self.config.scaler_path)?;
        Ok((model, scaler))
    }

    /// Modification times of both artifact files, or `None` if either is
    /// missing or unreadable.
    fn artifact_mtimes(&self) -> Option<(SystemTime, SystemTime)> {
        let mtime = |path: &Path| fs::metadata(path).and_then(|m| m.modified()).ok();
        Some((
            mtime(&self.config.model_path)?,
            mtime(&self.config.scaler_path)?,
        ))
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec(value)
        .with_context(|| format!("Failed to serialize artifact for {}", path.display()))?;
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("Failed to parse {}", path.display()))
}
