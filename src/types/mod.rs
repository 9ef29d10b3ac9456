//! Type definitions for the prediction service

pub mod request;
pub mod response;

pub use request::{CanonicalFeatures, FeatureSchema, PredictionRequest};
pub use response::{ErrorResponse, PriceEstimate};
