//! Crop Prediction Service - Main Entry Point
//!
//! Loads the disease classifier and the price/demand forests once at
//! startup, then serves the three prediction endpoints over HTTP.

use anyhow::Result;
use crop_prediction_service::{
    config::AppConfig,
    encoder::FeatureEncoder,
    metrics::{MetricsReporter, ServiceMetrics},
    models::inference::InferenceEngine,
    normalizer::RequestNormalizer,
    server::{self, AppState},
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("crop_prediction_service=info".parse()?),
        )
        .init();

    info!("Starting Crop Prediction Service");

    // Load configuration
    let config = AppConfig::load()?;
    info!("Configuration loaded successfully");

    // Initialize metrics
    let metrics = Arc::new(ServiceMetrics::new());

    // Load models into process-wide read-only state
    let engine = Arc::new(InferenceEngine::new(&config)?);
    info!(
        price_columns = engine.price_schema().len(),
        demand_columns = engine.demand_schema().len(),
        "Models loaded"
    );

    let state = Arc::new(AppState {
        engine,
        normalizer: RequestNormalizer::new(),
        encoder: FeatureEncoder::new(),
        metrics: metrics.clone(),
    });

    // Start metrics reporter (prints summary every 30 seconds)
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics, 30);
        reporter.start().await;
    });

    // Serve
    let addr = format!("{}:{}", config.http.host, config.http.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Listening for prediction requests");

    axum::serve(listener, server::create_router(state)).await?;

    Ok(())
}
