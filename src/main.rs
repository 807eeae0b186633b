// src/main.rs
use anyhow::Result;
use cardio_lib::config::ServiceConfig;
use cardio_lib::server;
use cardio_lib::store::ModelStore;
use log::{error, info};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    dotenv::dotenv().ok();
    info!("Starting heart disease prediction service");

    let config = ServiceConfig::from_env();
    config.log_config();

    let store = Arc::new(ModelStore::new(config.clone()));

    // Eagerly load or train so the first prediction request is not the one
    // paying for training. A failure here is logged but not fatal: the health
    // endpoint stays available and a later request retries the load.
    match store.load_or_train().await {
        Ok(_) => info!("Model loaded successfully at startup"),
        Err(e) => error!("Error loading model at startup: {:#}", e),
    }

    server::serve(&config, store).await
}
