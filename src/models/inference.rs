//! Process-wide inference engine for the prediction service

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::{PredictionError, PredictionResult};
use crate::models::classifier::DiseaseClassifier;
use crate::models::forest::ForestRegressor;
use crate::models::loader::ModelLoader;
use crate::types::request::FeatureSchema;
use crate::types::response::PriceEstimate;

/// Holds every loaded model for the process lifetime.
///
/// Built exactly once at startup and shared read-only across requests; no
/// mutation API exists after construction.
pub struct InferenceEngine {
    classifier: DiseaseClassifier,
    price_model: ForestRegressor,
    demand_model: ForestRegressor,
}

impl InferenceEngine {
    /// Load all models described by the configuration.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let loader = ModelLoader::with_threads(config.models.onnx_threads)?;
        let models_dir = Path::new(&config.models.models_dir);

        let classifier = loader
            .load_classifier(
                models_dir.join(&config.models.classifier_file),
                config.models.class_names.clone(),
            )
            .context("Failed to load disease classifier")?;

        let price_model = loader
            .load_forest(models_dir.join(&config.models.price_file))
            .context("Failed to load price model")?;

        let demand_model = loader
            .load_forest(models_dir.join(&config.models.demand_file))
            .context("Failed to load demand model")?;

        info!(
            classes = classifier.labels().len(),
            price_columns = price_model.schema().len(),
            demand_columns = demand_model.schema().len(),
            "Inference engine initialized"
        );

        Ok(Self {
            classifier,
            price_model,
            demand_model,
        })
    }

    /// Training schema of the price model.
    pub fn price_schema(&self) -> &FeatureSchema {
        self.price_model.schema()
    }

    /// Training schema of the demand model.
    pub fn demand_schema(&self) -> &FeatureSchema {
        self.demand_model.schema()
    }

    /// Classify an uploaded image into a disease label.
    pub fn classify_disease(&self, image_bytes: &[u8]) -> PredictionResult<String> {
        let image = image::load_from_memory(image_bytes)
            .map_err(|e| PredictionError::Validation(format!("Could not decode image: {e}")))?;

        let label = self.classifier.classify(&image)?;
        debug!(label = %label, "Disease classification complete");
        Ok(label)
    }

    /// Price point estimate plus the member-estimator spread.
    pub fn predict_price(&self, vector: &[f64]) -> PredictionResult<PriceEstimate> {
        let estimate = self.price_model.predict_with_range(vector)?;
        debug!(
            price = estimate.price,
            min = estimate.min,
            max = estimate.max,
            "Price inference complete"
        );
        Ok(estimate)
    }

    /// Scalar demand estimate.
    pub fn predict_demand(&self, vector: &[f64]) -> PredictionResult<f64> {
        let demand = self.demand_model.predict(vector)?;
        debug!(demand = demand, "Demand inference complete");
        Ok(demand)
    }
}
