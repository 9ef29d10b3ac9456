//! Crop Prediction Service Library
//!
//! Serves three pre-trained models behind request/response endpoints: an
//! image-based crop disease classifier, a vegetable price regressor with
//! ensemble-spread uncertainty, and a vegetable demand regressor.

pub mod config;
pub mod encoder;
pub mod error;
pub mod metrics;
pub mod models;
pub mod normalizer;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use encoder::FeatureEncoder;
pub use error::PredictionError;
pub use models::inference::InferenceEngine;
pub use normalizer::RequestNormalizer;
pub use types::{CanonicalFeatures, FeatureSchema, PredictionRequest, PriceEstimate};
