//! Training run configuration

use std::path::PathBuf;

use super::evaluate::DEFAULT_THRESHOLD;
use super::resample::SmoteConfig;
use super::target::TargetMapping;

/// Rows of the training matrix kept on each model for the sampling explainer
pub const DEFAULT_BACKGROUND_SIZE: usize = 100;

/// Holdout rows explained to compute global importance
pub const DEFAULT_IMPORTANCE_ROWS: usize = 200;

#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub input: PathBuf,
    pub models_dir: PathBuf,
    /// Seed for the split, oversampling and every model
    pub seed: u64,
    pub holdout_fraction: f64,
    pub smote: SmoteConfig,
    pub threshold: f64,
    pub background_size: usize,
    pub importance_rows: usize,
    /// Explicit event/non-event values for a non-binary label column
    pub target_mapping: Option<TargetMapping>,
    pub infer_schema_length: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("credit_risk_dataset.csv"),
            models_dir: PathBuf::from("models"),
            seed: 42,
            holdout_fraction: 0.2,
            smote: SmoteConfig::default(),
            threshold: DEFAULT_THRESHOLD,
            background_size: DEFAULT_BACKGROUND_SIZE,
            importance_rows: DEFAULT_IMPORTANCE_ROWS,
            target_mapping: None,
            infer_schema_length: 10000,
        }
    }
}

impl TrainingConfig {
    pub fn new(input: impl Into<PathBuf>, models_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            models_dir: models_dir.into(),
            ..Default::default()
        }
    }

    /// Use one seed everywhere, including the oversampler
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.smote.seed = seed;
        self
    }
}
