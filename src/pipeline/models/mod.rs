//! Classifier variants and the registry that trains them
//!
//! Every variant implements [`Classifier`]. Trained variants are wrapped in a
//! [`TrainedModel`] that binds them to the feature schema, seed and timestamp
//! of the run that produced them, plus a small background sample for the
//! model-agnostic explainer.

pub mod boosting;
pub mod forest;
pub mod logistic;
pub mod registry;
pub mod tree;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::matrix::Matrix;
pub use boosting::{BoostedTrees, BoostingParams};
pub use forest::{ForestParams, RandomForest};
pub use logistic::{LogisticParams, LogisticRegression};
pub use registry::{train_all, RegistryOutcome};
pub use tree::{DecisionTree, TreeNode};

/// Classifier family, in registry order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    LogisticRegression,
    RandomForest,
    Xgboost,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [
        ModelKind::LogisticRegression,
        ModelKind::RandomForest,
        ModelKind::Xgboost,
    ];

    /// Artifact key and CLI name
    pub fn key(&self) -> &'static str {
        match self {
            ModelKind::LogisticRegression => "logistic_regression",
            ModelKind::RandomForest => "random_forest",
            ModelKind::Xgboost => "xgboost",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModelKind::LogisticRegression => "Logistic Regression",
            ModelKind::RandomForest => "Random Forest",
            ModelKind::Xgboost => "XGBoost",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelKind::ALL
            .iter()
            .copied()
            .find(|k| k.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown model '{}', expected one of: logistic_regression, random_forest, xgboost",
                    s
                )
            })
    }
}

/// Why a single variant could not be fitted. Downgraded to a
/// [`TrainingFailure`](super::error::TrainingFailure) by the registry.
#[derive(Debug, Error, PartialEq)]
pub enum FitError {
    #[error("training set is empty")]
    EmptyInput,

    #[error("training labels contain a single class")]
    SingleClass,

    #[error("did not converge within {iterations} iterations")]
    NonConvergence { iterations: usize },

    #[error("non-finite {0} encountered during fitting")]
    NonFinite(&'static str),

    #[error("label count {labels} does not match row count {rows}")]
    LabelMismatch { rows: usize, labels: usize },
}

/// Reject inputs no variant can learn from
pub(crate) fn check_training_input(x: &Matrix, labels: &[u8]) -> Result<(), FitError> {
    if x.n_rows() != labels.len() {
        return Err(FitError::LabelMismatch {
            rows: x.n_rows(),
            labels: labels.len(),
        });
    }
    if x.is_empty() {
        return Err(FitError::EmptyInput);
    }
    let positives = labels.iter().filter(|&&l| l == 1).count();
    if positives == 0 || positives == labels.len() {
        return Err(FitError::SingleClass);
    }
    if x.as_slice().iter().any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite("feature value"));
    }
    Ok(())
}

/// Numerically stable logistic function
pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Common prediction surface of every classifier
pub trait Classifier {
    fn name(&self) -> &str;

    /// Width of the feature vectors this model accepts
    fn n_features(&self) -> usize;

    /// Pre-link score: log-odds, or averaged probability for bagged trees
    fn raw_output(&self, x: &[f64]) -> f64;

    /// Probability of default for one row
    fn predict_proba_row(&self, x: &[f64]) -> f64;

    fn has_probability_output(&self) -> bool {
        true
    }

    fn predict_proba(&self, matrix: &Matrix) -> Vec<f64> {
        matrix.rows().map(|row| self.predict_proba_row(row)).collect()
    }
}

/// The fitted estimator behind a trained model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ClassifierModel {
    Logistic(LogisticRegression),
    Forest(RandomForest),
    Boosted(BoostedTrees),
}

impl ClassifierModel {
    pub fn raw_output(&self, x: &[f64]) -> f64 {
        match self {
            ClassifierModel::Logistic(m) => m.decision_function(x),
            ClassifierModel::Forest(m) => m.mean_probability(x),
            ClassifierModel::Boosted(m) => m.margin(x),
        }
    }

    pub fn predict_proba_row(&self, x: &[f64]) -> f64 {
        match self {
            ClassifierModel::Logistic(m) => sigmoid(m.decision_function(x)),
            ClassifierModel::Forest(m) => m.mean_probability(x).clamp(0.0, 1.0),
            ClassifierModel::Boosted(m) => sigmoid(m.margin(x)),
        }
    }
}

/// A classifier bound to the schema and run that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    name: String,
    kind: ModelKind,
    seed: u64,
    /// RFC 3339 training timestamp
    trained_at: String,
    feature_names: Vec<String>,
    model: ClassifierModel,
    /// Training rows (pre-resampling) used as the sampling explainer's baseline
    background: Matrix,
}

impl TrainedModel {
    pub fn new(
        kind: ModelKind,
        seed: u64,
        feature_names: Vec<String>,
        model: ClassifierModel,
        background: Matrix,
    ) -> Self {
        Self {
            name: kind.key().to_string(),
            kind,
            seed,
            trained_at: chrono::Utc::now().to_rfc3339(),
            feature_names,
            model,
            background,
        }
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn trained_at(&self) -> &str {
        &self.trained_at
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn model(&self) -> &ClassifierModel {
        &self.model
    }

    pub fn background(&self) -> &Matrix {
        &self.background
    }
}

impl Classifier for TrainedModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    fn raw_output(&self, x: &[f64]) -> f64 {
        self.model.raw_output(x)
    }

    fn predict_proba_row(&self, x: &[f64]) -> f64 {
        self.model.predict_proba_row(x)
    }
}
