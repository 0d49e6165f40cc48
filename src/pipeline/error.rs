//! Error taxonomy for the training and serving pipelines.
//!
//! Structural failures (bad input data, missing artifacts, schema drift) are
//! `PipelineError` variants and propagate to the caller unchanged. Per-model
//! numeric failures during training are downgraded to [`TrainingFailure`]
//! records so sibling models keep training.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the pipeline stages.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Source data is missing or malformed. Fatal to the run.
    #[error("Failed to load data: {0}")]
    DataLoad(String),

    /// Transform/predict/explain requested before a preprocessor was fitted or loaded.
    #[error("Preprocessor has not been fitted yet: {0}")]
    NotFitted(String),

    /// Too few minority-class rows to synthesize neighbors from.
    #[error(
        "Insufficient minority samples for oversampling: found {found}, need at least 2"
    )]
    InsufficientMinoritySamples { found: usize },

    /// A persisted artifact could not be found at serving time.
    #[error("model files not found, run training first (missing '{key}' at {path})")]
    MissingArtifact { key: String, path: String },

    /// Input width does not match the fitted feature schema.
    #[error("Schema mismatch: expected {expected} features, found {found}")]
    SchemaMismatch { expected: usize, found: usize },

    /// Preprocessor and model come from different fitted schemas.
    #[error(
        "Schema mismatch at feature {index}: model expects '{expected}', preprocessor produces '{found}'"
    )]
    FeatureNameMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    /// A stage received no rows to work with.
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    /// Reading or writing a persisted artifact failed.
    #[error("Artifact '{key}' could not be processed: {message}")]
    Artifact { key: String, message: String },
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// A classifier variant that failed to train.
///
/// Recorded by the registry instead of aborting the remaining variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingFailure {
    pub model: String,
    pub reason: String,
}

impl TrainingFailure {
    pub fn new(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for TrainingFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed to train: {}", self.model, self.reason)
    }
}
