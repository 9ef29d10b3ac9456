//! Error taxonomy for the prediction pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::types::response::ErrorResponse;

/// Errors raised inside the prediction core.
///
/// Every variant is caught at the request boundary and rendered as the
/// standard error body; none escapes a handler as an unhandled fault.
#[derive(Debug, Error)]
pub enum PredictionError {
    /// Missing or unparseable required input
    #[error("{0}")]
    Validation(String),

    /// Feature alignment failure between a canonical record and a schema
    #[error("feature encoding failed: {0}")]
    Encoding(String),

    /// Model output dimensionality does not match the class label table
    #[error("model output shape mismatch: expected {expected} classes, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Underlying model invocation failure
    #[error("inference failed: {0}")]
    Inference(String),
}

impl PredictionError {
    /// HTTP status the error is rendered with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            PredictionError::Validation(_) => StatusCode::BAD_REQUEST,
            PredictionError::Encoding(_)
            | PredictionError::ShapeMismatch { .. }
            | PredictionError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PredictionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(detail = %message, "Prediction failed");
        }

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Result alias for core pipeline operations.
pub type PredictionResult<T> = std::result::Result<T, PredictionError>;
