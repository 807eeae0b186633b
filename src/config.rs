// src/config.rs
use log::info;
use std::env;
use std::path::PathBuf;

/// Runtime configuration for the prediction service.
///
/// All values come from environment variables with documented defaults, so a
/// bare `cargo run` works against files in the current directory.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// CSV file the model is trained from. Env: `DATASET_PATH`.
    pub dataset_path: PathBuf,
    /// Persisted fitted model. Env: `MODEL_PATH`.
    pub model_path: PathBuf,
    /// Persisted fitted scaler. Env: `SCALER_PATH`.
    pub scaler_path: PathBuf,
    /// Address the HTTP listener binds to. Env: `BIND_ADDR`.
    pub bind_addr: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("heart_disease_dataset.csv"),
            model_path: PathBuf::from("heart_disease_model.json"),
            scaler_path: PathBuf::from("scaler.json"),
            bind_addr: "127.0.0.1:5000".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let path_var = |name: &str, default: PathBuf| {
            env::var(name).map(PathBuf::from).unwrap_or(default)
        };

        Self {
            dataset_path: path_var("DATASET_PATH", defaults.dataset_path),
            model_path: path_var("MODEL_PATH", defaults.model_path),
            scaler_path: path_var("SCALER_PATH", defaults.scaler_path),
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
        }
    }

    /// Log the current configuration.
    pub fn log_config(&self) {
        info!("Service configuration:");
        info!("   Dataset: {}", self.dataset_path.display());
        info!("   Model artifact: {}", self.model_path.display());
        info!("   Scaler artifact: {}", self.scaler_path.display());
        info!("   Bind address: {}", self.bind_addr);
    }
}
