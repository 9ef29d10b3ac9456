//! Configuration management for the prediction service

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub models: ModelsConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
}

/// ML models configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    /// Directory containing model artifacts
    pub models_dir: String,
    /// Classifier ONNX file name
    #[serde(default = "default_classifier_file")]
    pub classifier_file: String,
    /// Price forest artifact file name
    #[serde(default = "default_price_file")]
    pub price_file: String,
    /// Demand forest artifact file name
    #[serde(default = "default_demand_file")]
    pub demand_file: String,
    /// Ordered class label table for the disease classifier. Index
    /// positions must match the model's training-time label encoding.
    #[serde(default = "default_class_names")]
    pub class_names: Vec<String>,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_classifier_file() -> String {
    "crop_disease_model.onnx".to_string()
}

fn default_price_file() -> String {
    "vegetable_price_predictor.json".to_string()
}

fn default_demand_file() -> String {
    "vegetable_demand_predictor.json".to_string()
}

fn default_onnx_threads() -> usize {
    1
}

fn default_class_names() -> Vec<String> {
    [
        "Apple___Apple_scab",
        "Apple___Black_rot",
        "Apple___Cedar_apple_rust",
        "Apple___Healthy",
        "Corn___Cercospora_leaf_spot",
        "Corn___Common_rust",
        "Corn___Healthy",
        "Corn___Northern_Leaf_Blight",
        "Potato___Early_blight",
        "Potato___Healthy",
        "Potato___Late_blight",
        "Tomato___Bacterial_spot",
        "Tomato___Early_blight",
        "Tomato___Late_blight",
        "Tomato___Healthy",
    ]
    .iter()
    .map(|name| name.to_string())
    .collect()
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig {
                host: "0.0.0.0".to_string(),
                port: 5001,
            },
            models: ModelsConfig {
                models_dir: "models".to_string(),
                classifier_file: default_classifier_file(),
                price_file: default_price_file(),
                demand_file: default_demand_file(),
                class_names: default_class_names(),
                onnx_threads: 1,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.http.port, 5001);
        assert_eq!(config.models.models_dir, "models");
        assert_eq!(config.models.class_names.len(), 15);
        assert_eq!(config.models.onnx_threads, 1);
    }

    #[test]
    fn test_class_table_order() {
        let names = default_class_names();
        assert_eq!(names[0], "Apple___Apple_scab");
        assert_eq!(names[14], "Tomato___Healthy");
    }
}
