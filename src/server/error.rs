// src/server/error.rs
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde_json::json;
use std::fmt;

/// API failure taxonomy, mapped to distinct status codes: malformed client
/// input is a 400, artifact/store trouble and everything else a 500.
#[derive(Debug)]
pub enum ApiError {
    /// The request body is missing a field or a value is not numeric.
    Validation(String),
    /// The artifact pair could not be loaded or trained.
    Store(String),
    /// Anything else that went wrong while handling the request.
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(_) => write!(f, "Invalid prediction request"),
            ApiError::Store(_) => write!(f, "Model artifacts unavailable"),
            ApiError::Internal(_) => write!(f, "Internal server error"),
        }
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> &str {
        match self {
            ApiError::Validation(detail)
            | ApiError::Store(detail)
            | ApiError::Internal(detail) => detail,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("{}: {}", self, self.detail());
        let body = Json(json!({
            "error": self.to_string(),
            "message": self.detail(),
        }));
        (self.status_code(), body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
