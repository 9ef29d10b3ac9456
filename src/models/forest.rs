//! Tree-ensemble regression models
//!
//! The price and demand regressors are forests of regression trees
//! deserialized from JSON artifacts exported at training time. Each
//! artifact carries the training feature schema alongside the trees, so a
//! model and the column layout it expects can never drift apart.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::{PredictionError, PredictionResult};
use crate::types::request::FeatureSchema;
use crate::types::response::PriceEstimate;

/// Node of a regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with prediction value
    Leaf { value: f64 },
    /// Internal node with split
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// A single member estimator of the ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    pub root: TreeNode,
}

impl RegressionTree {
    /// Walk the tree for one feature vector.
    pub fn predict(&self, vector: &[f64]) -> PredictionResult<f64> {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { value } => return Ok(*value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let observed = vector.get(*feature).copied().ok_or_else(|| {
                        PredictionError::Inference(format!(
                            "split references feature {feature} but the vector has {} entries",
                            vector.len()
                        ))
                    })?;
                    node = if observed <= *threshold { left } else { right };
                }
            }
        }
    }
}

/// On-disk artifact format for a forest regressor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestArtifact {
    /// Model name, used in logs and error messages
    pub name: String,
    /// Training column names, in training order
    pub feature_names: Vec<String>,
    /// Member estimators
    pub trees: Vec<RegressionTree>,
    /// Optional per-tree aggregation weights; a plain mean when absent
    #[serde(default)]
    pub tree_weights: Option<Vec<f64>>,
}

/// A loaded tree-ensemble regression model.
///
/// Immutable after construction; concurrent reads need no locking.
pub struct ForestRegressor {
    name: String,
    schema: FeatureSchema,
    trees: Vec<RegressionTree>,
    weights: Option<Vec<f64>>,
}

impl ForestRegressor {
    /// Build a regressor from a deserialized artifact.
    pub fn from_artifact(artifact: ForestArtifact) -> Result<Self> {
        if artifact.feature_names.is_empty() {
            anyhow::bail!("model '{}' declares no feature columns", artifact.name);
        }

        if let Some(weights) = &artifact.tree_weights {
            if weights.len() != artifact.trees.len() {
                anyhow::bail!(
                    "model '{}' has {} trees but {} weights",
                    artifact.name,
                    artifact.trees.len(),
                    weights.len()
                );
            }
            let total: f64 = weights.iter().sum();
            if total <= 0.0 {
                anyhow::bail!("model '{}' has non-positive total tree weight", artifact.name);
            }
        }

        Ok(Self {
            name: artifact.name,
            schema: FeatureSchema::new(artifact.feature_names),
            trees: artifact.trees,
            weights: artifact.tree_weights,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Training schema the model expects vectors to be aligned to.
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Number of member estimators.
    pub fn member_count(&self) -> usize {
        self.trees.len()
    }

    /// Individual member-estimator predictions for one vector.
    pub fn member_predictions(&self, vector: &[f64]) -> PredictionResult<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(PredictionError::Inference(format!(
                "model '{}' has no member estimators",
                self.name
            )));
        }

        self.trees.iter().map(|tree| tree.predict(vector)).collect()
    }

    /// The ensemble's own aggregate prediction.
    ///
    /// This is the model's aggregation rule, not a statistic recomputed by
    /// a caller: a weighted mean when the artifact carries tree weights,
    /// a plain mean otherwise.
    pub fn predict(&self, vector: &[f64]) -> PredictionResult<f64> {
        let members = self.member_predictions(vector)?;

        match &self.weights {
            Some(weights) => {
                let total: f64 = weights.iter().sum();
                let weighted: f64 = members
                    .iter()
                    .zip(weights)
                    .map(|(prediction, weight)| prediction * weight)
                    .sum();
                Ok(weighted / total)
            }
            None => Ok(members.iter().sum::<f64>() / members.len() as f64),
        }
    }

    /// Aggregate prediction plus the min/max spread across members.
    ///
    /// The spread is a dispersion indicator, not a confidence interval;
    /// with weighted aggregation the point estimate can fall outside it.
    pub fn predict_with_range(&self, vector: &[f64]) -> PredictionResult<PriceEstimate> {
        let price = self.predict(vector)?;
        let members = self.member_predictions(vector)?;

        let min = members.iter().copied().fold(f64::INFINITY, f64::min);
        let max = members.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Ok(PriceEstimate { price, min, max })
    }
}

/// Parse a forest artifact from its JSON serialization.
pub fn parse_artifact(bytes: &[u8]) -> Result<ForestArtifact> {
    serde_json::from_slice(bytes).context("Failed to parse forest artifact")
}
