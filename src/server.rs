//! HTTP surface for the prediction service
//!
//! Thin layer over the core: handlers hand validated inputs to the
//! normalizer/encoder/engine pipeline and render its outputs. Every error
//! raised inside the core is caught here and converted into the standard
//! error shape; nothing propagates as an unhandled fault.

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Multipart, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::encoder::FeatureEncoder;
use crate::error::{PredictionError, PredictionResult};
use crate::metrics::ServiceMetrics;
use crate::models::inference::InferenceEngine;
use crate::normalizer::RequestNormalizer;
use crate::types::request::PredictionRequest;
use crate::types::response::{DemandResponse, DiseaseResponse, PriceResponse};

/// Shared per-process state handed to every handler.
pub struct AppState {
    pub engine: Arc<InferenceEngine>,
    pub normalizer: RequestNormalizer,
    pub encoder: FeatureEncoder,
    pub metrics: Arc<ServiceMetrics>,
}

/// Create the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict-disease", post(predict_disease))
        .route("/predict-price", post(predict_price))
        .route("/predict-demand", post(predict_demand))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

async fn predict_disease(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    let start = Instant::now();

    let result = match read_upload(&mut multipart).await {
        Ok(bytes) => state
            .engine
            .classify_disease(&bytes)
            .map(DiseaseResponse::new),
        Err(err) => Err(err),
    };

    finish(&state, "predict-disease", start, result)
}

async fn predict_price(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PredictionRequest>, JsonRejection>,
) -> Response {
    let start = Instant::now();

    let result = parse_body(body).and_then(|request| {
        let schema = state.engine.price_schema();
        let features = state.normalizer.normalize(&request, schema)?;
        let vector = state.encoder.encode(&features, schema)?;
        let estimate = state.engine.predict_price(&vector)?;
        Ok(PriceResponse::from(estimate))
    });

    finish(&state, "predict-price", start, result)
}

async fn predict_demand(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PredictionRequest>, JsonRejection>,
) -> Response {
    let start = Instant::now();

    let result = parse_body(body).and_then(|request| {
        let schema = state.engine.demand_schema();
        let features = state.normalizer.normalize(&request, schema)?;
        let vector = state.encoder.encode(&features, schema)?;
        let demand = state.engine.predict_demand(&vector)?;
        Ok(DemandResponse::new(demand))
    });

    finish(&state, "predict-demand", start, result)
}

/// Record metrics and render the handler outcome.
fn finish<T: serde::Serialize>(
    state: &AppState,
    endpoint: &str,
    start: Instant,
    result: PredictionResult<T>,
) -> Response {
    match result {
        Ok(response) => {
            let count = state.metrics.record_request(endpoint, start.elapsed());
            if count % 100 == 0 {
                info!(
                    served = count,
                    throughput = format!("{:.1} req/s", state.metrics.get_throughput()),
                    "Serving milestone"
                );
            }
            Json(response).into_response()
        }
        Err(err) => {
            state.metrics.record_error(endpoint);
            err.into_response()
        }
    }
}

/// Unwrap a JSON body, mapping malformed input to the standard error shape.
fn parse_body(
    body: Result<Json<PredictionRequest>, JsonRejection>,
) -> PredictionResult<PredictionRequest> {
    match body {
        Ok(Json(request)) => Ok(request),
        Err(rejection) => Err(PredictionError::Validation(format!(
            "Invalid request body: {rejection}"
        ))),
    }
}

/// Pull the uploaded image out of the multipart form.
async fn read_upload(multipart: &mut Multipart) -> PredictionResult<Bytes> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        PredictionError::Validation(format!("Invalid multipart body: {e}"))
    })? {
        if field.name() != Some("file") {
            continue;
        }

        if field.file_name().unwrap_or("").is_empty() {
            return Err(PredictionError::Validation("No file selected".to_string()));
        }

        return field
            .bytes()
            .await
            .map_err(|e| PredictionError::Validation(format!("Could not read upload: {e}")));
    }

    Err(PredictionError::Validation("No file uploaded".to_string()))
}
