//! External response shapes for the prediction endpoints
//!
//! This is the response formatter side of the pipeline: internal results are
//! mapped into the wire shapes here, and values are rounded to two decimals
//! at this boundary only. Rounded values never feed back into computation.

use serde::{Deserialize, Serialize};

/// Round a value to two decimal places for presentation.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Point estimate plus member spread from the price ensemble, unrounded.
///
/// `min` and `max` are the extremes of the individual member-estimator
/// predictions, a dispersion indicator rather than a confidence interval.
/// With weighted aggregation the point estimate is not guaranteed to fall
/// inside `[min, max]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceEstimate {
    pub price: f64,
    pub min: f64,
    pub max: f64,
}

/// Wire shape of the price range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

/// Successful disease prediction response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiseaseResponse {
    pub prediction: String,
    pub status: String,
}

impl DiseaseResponse {
    pub fn new(prediction: String) -> Self {
        Self {
            prediction,
            status: "success".to_string(),
        }
    }
}

/// Successful price prediction response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceResponse {
    pub predicted_price: f64,
    pub predicted_range: PriceRange,
    pub status: String,
}

impl From<PriceEstimate> for PriceResponse {
    fn from(estimate: PriceEstimate) -> Self {
        Self {
            predicted_price: round2(estimate.price),
            predicted_range: PriceRange {
                min: round2(estimate.min),
                max: round2(estimate.max),
            },
            status: "success".to_string(),
        }
    }
}

/// Successful demand prediction response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandResponse {
    pub predicted_demand: f64,
    pub status: String,
}

impl DemandResponse {
    pub fn new(demand: f64) -> Self {
        Self {
            predicted_demand: round2(demand),
            status: "success".to_string(),
        }
    }
}

/// Shared failure shape for every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: String,
}

impl ErrorResponse {
    pub fn new(error: String) -> Self {
        Self {
            error,
            status: "error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(12.345), 12.35);
        assert_eq!(round2(12.344), 12.34);
        assert_eq!(round2(-0.005), -0.01);
        assert_eq!(round2(10.0), 10.0);
    }

    #[test]
    fn test_price_response_rounds_at_presentation() {
        let estimate = PriceEstimate {
            price: 24.6789,
            min: 20.111,
            max: 29.999,
        };

        let response = PriceResponse::from(estimate);
        assert_eq!(response.predicted_price, 24.68);
        assert_eq!(response.predicted_range.min, 20.11);
        assert_eq!(response.predicted_range.max, 30.0);
        assert_eq!(response.status, "success");
    }

    #[test]
    fn test_disease_response_shape() {
        let response = DiseaseResponse::new("Tomato___Early_blight".to_string());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["prediction"], "Tomato___Early_blight");
        assert_eq!(json["status"], "success");
    }

    #[test]
    fn test_demand_response_shape() {
        let response = DemandResponse::new(143.2189);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["predicted_demand"], 143.22);
        assert_eq!(json["status"], "success");
    }

    #[test]
    fn test_error_response_shape() {
        let response =
            ErrorResponse::new("model output shape mismatch: expected 15 classes, got 14".to_string());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["status"], "error");
        assert!(json["error"].as_str().unwrap().contains("shape mismatch"));
    }
}
