//! Feature encoding for price and demand model inference.
//!
//! Converts a canonical feature record into the fixed-length numeric
//! vector each model was trained on. The encoding must reproduce the
//! training-time pipeline exactly: one-hot expansion of the categorical
//! fields followed by a reindex against the training schema, emitting
//! columns strictly in schema order.

use std::collections::HashMap;

use crate::error::{PredictionError, PredictionResult};
use crate::types::request::{CanonicalFeatures, FeatureSchema, MARKET_DEMAND_COLUMN};

/// Encoder that aligns canonical features to a model's training columns.
pub struct FeatureEncoder;

impl FeatureEncoder {
    /// Create a new feature encoder.
    pub fn new() -> Self {
        Self
    }

    /// Encode a canonical record against a training schema.
    ///
    /// The returned vector always has exactly `schema.len()` entries.
    /// A categorical value the schema has no indicator column for is
    /// dropped without error, leaving that field's indicator block all
    /// zero; prediction proceeds with the degraded representation.
    pub fn encode(
        &self,
        features: &CanonicalFeatures,
        schema: &FeatureSchema,
    ) -> PredictionResult<Vec<f64>> {
        let mut columns: HashMap<String, f64> = HashMap::new();

        columns.insert("temperature".to_string(), features.temperature);
        columns.insert("rainfall".to_string(), features.rainfall);
        columns.insert("seasonal factor".to_string(), features.seasonal_factor);
        columns.insert("fuel price".to_string(), features.fuel_price);

        match features.market_demand {
            Some(demand) => {
                columns.insert(MARKET_DEMAND_COLUMN.to_string(), demand);
            }
            None if schema.requires_market_demand() => {
                return Err(PredictionError::Encoding(format!(
                    "schema declares '{MARKET_DEMAND_COLUMN}' but the canonical record carries none"
                )));
            }
            None => {}
        }

        // One-hot indicator columns, named the way the training pipeline
        // named them: <field>_<value> with value 1 for the observed level.
        columns.insert(format!("vegetable_{}", features.vegetable), 1.0);
        columns.insert(format!("city_{}", features.city), 1.0);
        columns.insert(format!("day of week_{}", features.day_of_week), 1.0);

        // Reindex: schema columns absent from the generated set become 0,
        // generated columns absent from the schema are dropped, order is
        // the schema's.
        Ok(schema
            .columns()
            .iter()
            .map(|column| columns.get(column.as_str()).copied().unwrap_or(0.0))
            .collect())
    }
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::new()
    }
}
