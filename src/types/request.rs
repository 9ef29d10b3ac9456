//! Request-side data structures for the prediction pipeline

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Training column name for the optional market demand feature.
pub const MARKET_DEMAND_COLUMN: &str = "market demand";

/// Raw prediction request body: an unordered map of loosely-typed values
/// with unspecified key casing. Alias resolution happens in the normalizer,
/// not here.
pub type PredictionRequest = HashMap<String, serde_json::Value>;

/// Canonical feature record produced by the request normalizer.
///
/// Categorical fields are stored in title case. `market_demand` is `Some`
/// only for models whose training schema declares the market demand column;
/// carrying it for any other model would break the encoder's alignment
/// contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalFeatures {
    pub temperature: f64,
    pub rainfall: f64,
    pub seasonal_factor: f64,
    pub fuel_price: f64,
    pub vegetable: String,
    pub city: String,
    pub day_of_week: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_demand: Option<f64>,
}

/// Ordered list of column names a model was trained against.
///
/// Established at training time, loaded once at startup from the model
/// artifact, and immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Columns in training order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether this schema carries the market demand column.
    pub fn requires_market_demand(&self) -> bool {
        self.contains(MARKET_DEMAND_COLUMN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price_schema() -> FeatureSchema {
        FeatureSchema::new(vec![
            "temperature".to_string(),
            "rainfall".to_string(),
            "seasonal factor".to_string(),
            "fuel price".to_string(),
            "vegetable_Tomato".to_string(),
            "city_Mumbai".to_string(),
            "day of week_Monday".to_string(),
        ])
    }

    #[test]
    fn test_schema_lookup() {
        let schema = price_schema();
        assert_eq!(schema.len(), 7);
        assert!(schema.contains("vegetable_Tomato"));
        assert!(!schema.contains("vegetable_Okra"));
        assert!(!schema.requires_market_demand());
    }

    #[test]
    fn test_market_demand_detection() {
        let mut columns: Vec<String> =
            price_schema().columns().iter().cloned().collect();
        columns.push(MARKET_DEMAND_COLUMN.to_string());
        let schema = FeatureSchema::new(columns);
        assert!(schema.requires_market_demand());
    }

    #[test]
    fn test_canonical_features_roundtrip() {
        let features = CanonicalFeatures {
            temperature: 30.0,
            rainfall: 5.0,
            seasonal_factor: 1.2,
            fuel_price: 90.0,
            vegetable: "Tomato".to_string(),
            city: "Mumbai".to_string(),
            day_of_week: "Monday".to_string(),
            market_demand: None,
        };

        let json = serde_json::to_string(&features).unwrap();
        let deserialized: CanonicalFeatures = serde_json::from_str(&json).unwrap();
        assert_eq!(features, deserialized);
    }
}
