// src/lib.rs
//! Heart disease risk prediction service: dataset loading, random forest
//! training, artifact persistence, and the HTTP serving layer.

pub mod config;
pub mod dataset;
pub mod model;
pub mod server;
pub mod store;
pub mod training;
