// src/bin/train_model.rs
//! Force a fresh training run, regardless of any existing artifacts.
//! `--dry-run` trains and reports but leaves the persisted pair untouched.

use anyhow::Result;
use cardio_lib::config::ServiceConfig;
use cardio_lib::dataset::{load_dataset, FEATURE_NAMES};
use cardio_lib::model::ForestParams;
use cardio_lib::store::ModelStore;
use cardio_lib::training::{self, TrainedArtifacts};
use log::warn;
use std::env;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    dotenv::dotenv().ok();

    let args: Vec<String> = env::args().collect();
    let dry_run = args.contains(&"--dry-run".to_string());
    if dry_run {
        warn!("DRY RUN MODE: artifacts will not be written to disk.");
    }

    let config = ServiceConfig::from_env();
    config.log_config();

    let dataset = load_dataset(&config.dataset_path)?;
    let artifacts = training::train(&dataset, ForestParams::default())?;

    if !dry_run {
        let store = ModelStore::new(config.clone());
        store.persist(&artifacts)?;
    }

    print_training_summary(&config, &artifacts, dataset.len(), dry_run);
    Ok(())
}

fn print_training_summary(
    config: &ServiceConfig,
    artifacts: &TrainedArtifacts,
    n_rows: usize,
    dry_run: bool,
) {
    println!("\n=== TRAINING SUMMARY ===");
    println!("Trained at: {}", artifacts.trained_at);
    println!("Dataset rows: {}", n_rows);
    println!("Held-out accuracy: {:.2}", artifacts.held_out_accuracy);

    let mut ranked: Vec<(&str, f64)> = FEATURE_NAMES
        .iter()
        .copied()
        .zip(artifacts.model.feature_importances().iter().copied())
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    println!("Top features:");
    for (name, importance) in ranked.iter().take(5) {
        println!("   {}: {:.4}", name, importance);
    }

    if dry_run {
        println!("\nDry run: the persisted artifact pair was not modified.");
    } else {
        println!("\nArtifacts written:");
        println!("   {}", config.model_path.display());
        println!("   {}", config.scaler_path.display());
        println!("\nThe service will pick these up on its next request.");
    }
}
