//! Model artifact loader
//!
//! Loads the ONNX classifier session and the JSON forest artifacts once at
//! process start. Nothing is reloaded or mutated afterwards.

use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::info;

use crate::models::classifier::DiseaseClassifier;
use crate::models::forest::{parse_artifact, ForestRegressor};

/// Loader for model artifacts.
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with default settings (1 thread).
    pub fn new() -> Result<Self> {
        Self::with_threads(1)
    }

    /// Create a new model loader with specified number of threads.
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        // Initialize ONNX Runtime
        ort::init().commit()?;
        info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Load the disease classifier from an ONNX file.
    pub fn load_classifier<P: AsRef<Path>>(
        &self,
        path: P,
        labels: Vec<String>,
    ) -> Result<DiseaseClassifier> {
        let path = path.as_ref();

        if labels.is_empty() {
            anyhow::bail!("class label table is empty");
        }

        info!(path = %path.display(), threads = self.onnx_threads, "Loading classifier model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load classifier from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "input".to_string());

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "output".to_string());

        info!(
            input = %input_name,
            output = %output_name,
            classes = labels.len(),
            "Classifier loaded successfully"
        );

        Ok(DiseaseClassifier::new(
            session,
            input_name,
            output_name,
            labels,
        ))
    }

    /// Load a forest regressor from a JSON artifact.
    pub fn load_forest<P: AsRef<Path>>(&self, path: P) -> Result<ForestRegressor> {
        let path = path.as_ref();

        info!(path = %path.display(), "Loading forest artifact");

        let bytes =
            std::fs::read(path).context(format!("Failed to read forest artifact {:?}", path))?;
        let artifact = parse_artifact(&bytes)?;
        let model = ForestRegressor::from_artifact(artifact)?;

        info!(
            model = %model.name(),
            columns = model.schema().len(),
            members = model.member_count(),
            "Forest model loaded successfully"
        );

        Ok(model)
    }
}
