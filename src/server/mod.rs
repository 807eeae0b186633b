// src/server/mod.rs
use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use log::info;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::ServiceConfig;
use crate::store::ModelStore;

pub mod error;
pub mod handlers;

/// Build the service router. Cross-origin requests are permitted from any
/// origin.
pub fn router(store: Arc<ModelStore>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/predict", post(handlers::predict))
        .route("/model-info", get(handlers::model_info))
        .layer(CorsLayer::permissive())
        .with_state(store)
}

/// Bind the configured address and serve until the process exits.
pub async fn serve(config: &ServiceConfig, store: Arc<ModelStore>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, router(store))
        .await
        .context("HTTP server terminated")
}
