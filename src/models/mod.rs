//! ML model inference components

pub mod classifier;
pub mod forest;
pub mod inference;
pub mod loader;

pub use classifier::DiseaseClassifier;
pub use forest::ForestRegressor;
pub use inference::InferenceEngine;
pub use loader::ModelLoader;
