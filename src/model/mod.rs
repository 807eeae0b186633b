// src/model/mod.rs
//! Serde-serializable ML primitives: the feature scaler, CART decision trees,
//! the random forest ensemble, and evaluation metrics.

pub mod forest;
pub mod metrics;
pub mod scaler;
mod tree;

pub use forest::{ForestParams, RandomForest};
pub use scaler::StandardScaler;
