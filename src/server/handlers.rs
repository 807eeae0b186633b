// src/server/handlers.rs
use axum::extract::State;
use axum::Json;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::dataset::FEATURE_NAMES;
use crate::model::RandomForest;
use crate::store::ModelStore;

use super::error::{ApiError, ApiResult};

/// The 13 clinical measurements, all required and numeric. No range
/// validation is performed.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionRequest {
    pub age: f64,
    pub sex: f64,
    pub cp: f64,
    pub trestbps: f64,
    pub chol: f64,
    pub fbs: f64,
    pub restecg: f64,
    pub thalach: f64,
    pub exang: f64,
    pub oldpeak: f64,
    pub slope: f64,
    pub ca: f64,
    pub thal: f64,
}

impl PredictionRequest {
    /// Feature vector in the column order the model was trained on.
    pub fn feature_vector(&self) -> Vec<f64> {
        vec![
            self.age,
            self.sex,
            self.cp,
            self.trestbps,
            self.chol,
            self.fbs,
            self.restecg,
            self.thalach,
            self.exang,
            self.oldpeak,
            self.slope,
            self.ca,
            self.thal,
        ]
    }
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    /// Positive-class probability as a percentage, rounded to 2 decimals.
    pub prediction: f64,
    /// Global importances keyed by feature name; identical for every request.
    pub feature_importance: Map<String, Value>,
    pub confidence: &'static str,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

pub async fn predict(
    State(store): State<Arc<ModelStore>>,
    Json(body): Json<Value>,
) -> ApiResult<Json<PredictionResponse>> {
    info!("Received prediction request");
    let request: PredictionRequest =
        serde_json::from_value(body).map_err(|e| ApiError::Validation(e.to_string()))?;

    let (stored, scaler) = store
        .load_or_train()
        .await
        .map_err(|e| ApiError::Store(format!("{:#}", e)))?;

    let scaled = scaler.transform_row(&request.feature_vector());
    let probability = stored.model.predict_proba(&scaled);
    let percentage = round2(probability * 100.0);
    info!("Prediction made: {}%", percentage);

    Ok(Json(PredictionResponse {
        prediction: percentage,
        feature_importance: importance_map(&stored.model),
        confidence: confidence_label(percentage),
    }))
}

pub async fn model_info(State(store): State<Arc<ModelStore>>) -> ApiResult<Json<Value>> {
    let (stored, _scaler) = store
        .load_or_train()
        .await
        .map_err(|e| ApiError::Store(format!("{:#}", e)))?;

    let params = stored.model.params();
    Ok(Json(json!({
        "model_type": "Random Forest Classifier",
        "n_estimators": params.n_trees,
        "max_depth": params.max_depth,
        "feature_importance": importance_map(&stored.model),
    })))
}

/// Qualitative confidence from the distance to the 50% midpoint.
fn confidence_label(percentage: f64) -> &'static str {
    let distance = (percentage - 50.0).abs();
    if distance > 25.0 {
        "high"
    } else if distance > 10.0 {
        "medium"
    } else {
        "low"
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn importance_map(model: &RandomForest) -> Map<String, Value> {
    FEATURE_NAMES
        .iter()
        .zip(model.feature_importances())
        .map(|(name, importance)| (name.to_string(), json!(importance)))
        .collect()
}

/// A complete, valid request body; shared with the router tests.
#[cfg(test)]
pub(super) fn full_request_body() -> Value {
    json!({
        "age": 63.0, "sex": 1.0, "cp": 3.0, "trestbps": 145.0, "chol": 233.0,
        "fbs": 1.0, "restecg": 0.0, "thalach": 150.0, "exang": 0.0,
        "oldpeak": 2.3, "slope": 0.0, "ca": 0.0, "thal": 1.0
    })
}
