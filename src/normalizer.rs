//! Request normalization for price and demand model inference.
//!
//! Resolves case- and spacing-variant field aliases to the canonical
//! schema, applies the defaults the models were trained with, and
//! canonicalizes categorical text casing.

use serde_json::Value;

use crate::error::{PredictionError, PredictionResult};
use crate::types::request::{CanonicalFeatures, FeatureSchema, PredictionRequest};

/// Accepted spellings per canonical field, probed in order: the
/// human-readable capitalized form first, then the lower-case form.
const TEMPERATURE_KEYS: &[&str] = &["Temperature", "temperature"];
const RAINFALL_KEYS: &[&str] = &["Rainfall", "rainfall"];
const SEASONAL_FACTOR_KEYS: &[&str] = &["Seasonal Factor", "seasonal factor"];
const FUEL_PRICE_KEYS: &[&str] = &["Fuel Price", "fuel price"];
const VEGETABLE_KEYS: &[&str] = &["Vegetable", "vegetable"];
const CITY_KEYS: &[&str] = &["City", "city"];
const DAY_OF_WEEK_KEYS: &[&str] = &["Day of Week", "day of week"];
const MARKET_DEMAND_KEYS: &[&str] = &["Market Demand", "market demand"];

/// Normalizer that turns a loosely-typed request body into a canonical
/// feature record.
///
/// Matches the preprocessing done at training time: absent numeric fields
/// default to 0, absent categorical fields default to the training
/// defaults, and categorical values are title-cased regardless of input
/// casing.
pub struct RequestNormalizer;

impl RequestNormalizer {
    /// Create a new request normalizer.
    pub fn new() -> Self {
        Self
    }

    /// Normalize a request against a model's training schema.
    ///
    /// The schema only influences whether the optional market demand field
    /// is populated; a schema without that column must not see the field at
    /// all, or the encoder's alignment contract would break.
    pub fn normalize(
        &self,
        request: &PredictionRequest,
        schema: &FeatureSchema,
    ) -> PredictionResult<CanonicalFeatures> {
        let market_demand = if schema.requires_market_demand() {
            Some(self.numeric_field(request, MARKET_DEMAND_KEYS)?)
        } else {
            None
        };

        Ok(CanonicalFeatures {
            temperature: self.numeric_field(request, TEMPERATURE_KEYS)?,
            rainfall: self.numeric_field(request, RAINFALL_KEYS)?,
            seasonal_factor: self.numeric_field(request, SEASONAL_FACTOR_KEYS)?,
            fuel_price: self.numeric_field(request, FUEL_PRICE_KEYS)?,
            vegetable: self.categorical_field(request, VEGETABLE_KEYS, "Tomato")?,
            city: self.categorical_field(request, CITY_KEYS, "Mumbai")?,
            day_of_week: self.categorical_field(request, DAY_OF_WEEK_KEYS, "Monday")?,
            market_demand,
        })
    }

    /// First value present under any accepted spelling.
    fn first_present<'a>(&self, request: &'a PredictionRequest, keys: &[&str]) -> Option<&'a Value> {
        keys.iter().find_map(|key| request.get(*key))
    }

    /// Resolve a numeric field: first present alias coerced to f64,
    /// defaulting to 0.0 when absent.
    fn numeric_field(&self, request: &PredictionRequest, keys: &[&str]) -> PredictionResult<f64> {
        match self.first_present(request, keys) {
            Some(value) => coerce_number(keys[1], value),
            None => Ok(0.0),
        }
    }

    /// Resolve a categorical field: first present alias title-cased,
    /// falling back to the per-field training default.
    fn categorical_field(
        &self,
        request: &PredictionRequest,
        keys: &[&str],
        default: &str,
    ) -> PredictionResult<String> {
        match self.first_present(request, keys) {
            Some(Value::String(text)) => Ok(title_case(text)),
            Some(other) => Err(PredictionError::Validation(format!(
                "field '{}' must be a string, got {other}",
                keys[1]
            ))),
            None => Ok(default.to_string()),
        }
    }
}

impl Default for RequestNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Coerce a JSON value to f64, accepting numbers and numeric strings.
fn coerce_number(field: &str, value: &Value) -> PredictionResult<f64> {
    match value {
        Value::Number(number) => number.as_f64().ok_or_else(|| {
            PredictionError::Validation(format!("field '{field}' is out of numeric range"))
        }),
        Value::String(text) => text.trim().parse::<f64>().map_err(|_| {
            PredictionError::Validation(format!("field '{field}' is not a number: '{text}'"))
        }),
        other => Err(PredictionError::Validation(format!(
            "field '{field}' must be numeric, got {other}"
        ))),
    }
}

/// Title-case a categorical value: the first letter of each word
/// upper-cased, the rest lower-cased. Word boundaries are any
/// non-alphabetic character, matching the training-time canonicalization.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_alphabetic = false;

    for ch in value.chars() {
        if ch.is_alphabetic() {
            if prev_alphabetic {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alphabetic = true;
        } else {
            out.push(ch);
            prev_alphabetic = false;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

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

    fn demand_schema() -> FeatureSchema {
        let mut columns: Vec<String> = price_schema().columns().to_vec();
        columns.push("market demand".to_string());
        FeatureSchema::new(columns)
    }

    fn request(pairs: &[(&str, Value)]) -> PredictionRequest {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_capitalized_aliases_resolve() {
        let normalizer = RequestNormalizer::new();
        let body = request(&[
            ("Temperature", json!(30)),
            ("Rainfall", json!(5)),
            ("Seasonal Factor", json!(1.2)),
            ("Fuel Price", json!(90)),
            ("Vegetable", json!("tomato")),
            ("City", json!("mumbai")),
            ("Day of Week", json!("monday")),
        ]);

        let features = normalizer.normalize(&body, &price_schema()).unwrap();
        assert_eq!(features.temperature, 30.0);
        assert_eq!(features.seasonal_factor, 1.2);
        assert_eq!(features.vegetable, "Tomato");
        assert_eq!(features.city, "Mumbai");
        assert_eq!(features.day_of_week, "Monday");
        assert_eq!(features.market_demand, None);
    }

    #[test]
    fn test_lowercase_aliases_resolve() {
        let normalizer = RequestNormalizer::new();
        let body = request(&[
            ("temperature", json!("28.5")),
            ("fuel price", json!(88)),
            ("vegetable", json!("OKRA")),
        ]);

        let features = normalizer.normalize(&body, &price_schema()).unwrap();
        assert_eq!(features.temperature, 28.5);
        assert_eq!(features.fuel_price, 88.0);
        assert_eq!(features.vegetable, "Okra");
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let normalizer = RequestNormalizer::new();
        let features = normalizer
            .normalize(&PredictionRequest::new(), &price_schema())
            .unwrap();

        assert_eq!(features.temperature, 0.0);
        assert_eq!(features.rainfall, 0.0);
        assert_eq!(features.vegetable, "Tomato");
        assert_eq!(features.city, "Mumbai");
        assert_eq!(features.day_of_week, "Monday");
    }

    #[test]
    fn test_market_demand_only_for_schemas_that_declare_it() {
        let normalizer = RequestNormalizer::new();
        let body = request(&[("Market Demand", json!(120))]);

        let price = normalizer.normalize(&body, &price_schema()).unwrap();
        assert_eq!(price.market_demand, None);

        let demand = normalizer.normalize(&body, &demand_schema()).unwrap();
        assert_eq!(demand.market_demand, Some(120.0));
    }

    #[test]
    fn test_market_demand_defaults_when_schema_requires_it() {
        let normalizer = RequestNormalizer::new();
        let features = normalizer
            .normalize(&PredictionRequest::new(), &demand_schema())
            .unwrap();

        assert_eq!(features.market_demand, Some(0.0));
    }

    #[test]
    fn test_unparseable_number_is_rejected() {
        let normalizer = RequestNormalizer::new();
        let body = request(&[("Temperature", json!("warm"))]);

        let err = normalizer.normalize(&body, &price_schema()).unwrap_err();
        assert!(matches!(err, PredictionError::Validation(_)));
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn test_non_string_categorical_is_rejected() {
        let normalizer = RequestNormalizer::new();
        let body = request(&[("Vegetable", json!(7))]);

        let err = normalizer.normalize(&body, &price_schema()).unwrap_err();
        assert!(matches!(err, PredictionError::Validation(_)));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("tomato"), "Tomato");
        assert_eq!(title_case("NAVI MUMBAI"), "Navi Mumbai");
        assert_eq!(title_case("dAy oF wEEk"), "Day Of Week");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let normalizer = RequestNormalizer::new();
        let body = request(&[
            ("Temperature", json!(30)),
            ("Vegetable", json!("tomato")),
            ("City", json!("navi mumbai")),
            ("Day of Week", json!("friday")),
        ]);

        let once = normalizer.normalize(&body, &price_schema()).unwrap();

        let canonical = request(&[
            ("Temperature", json!(once.temperature)),
            ("Rainfall", json!(once.rainfall)),
            ("Seasonal Factor", json!(once.seasonal_factor)),
            ("Fuel Price", json!(once.fuel_price)),
            ("Vegetable", json!(once.vegetable.clone())),
            ("City", json!(once.city.clone())),
            ("Day of Week", json!(once.day_of_week.clone())),
        ]);
        let twice = normalizer.normalize(&canonical, &price_schema()).unwrap();

        assert_eq!(once, twice);
    }
}
