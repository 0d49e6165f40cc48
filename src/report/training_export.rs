//! Training run report export

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::pipeline::{EvaluationRecord, FeatureImportance, TrainingFailure};

/// Metadata about the training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    /// Credrisk version
    pub credrisk_version: String,
    /// Input file path
    pub input_file: String,
    pub seed: u64,
    pub holdout_fraction: f64,
    /// Decision threshold used for precision/recall/F1
    pub threshold: f64,
    pub smote_k_neighbors: usize,
    pub smote_target_ratio: f64,
}

/// Label counts of one partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassBalance {
    pub non_default: usize,
    pub default: usize,
}

impl From<(usize, usize)> for ClassBalance {
    fn from((non_default, default): (usize, usize)) -> Self {
        Self { non_default, default }
    }
}

/// Row counts through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub loaded_rows: usize,
    /// Rows dropped for a null or unmapped label
    pub dropped_rows: usize,
    pub train_rows: usize,
    pub holdout_rows: usize,
    /// Width of the transformed feature schema
    pub features: usize,
    pub train_before_resampling: ClassBalance,
    pub train_after_resampling: ClassBalance,
    pub synthetic_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingValueEntry {
    pub column: String,
    pub ratio: f64,
}

/// Global importance ranking of one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelImportance {
    pub model: String,
    pub features: Vec<FeatureImportance>,
}

/// Complete report written next to the model artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub metadata: RunMetadata,
    pub dataset: DatasetSummary,
    pub missing_values: Vec<MissingValueEntry>,
    pub evaluations: Vec<EvaluationRecord>,
    pub failures: Vec<TrainingFailure>,
    pub importance: Vec<ModelImportance>,
}

impl TrainingReport {
    /// Model with the highest holdout ROC-AUC, if any was scored
    pub fn best_model(&self) -> Option<&EvaluationRecord> {
        self.evaluations
            .iter()
            .filter(|r| r.metrics().is_some())
            .max_by(|a, b| {
                let auc = |r: &EvaluationRecord| r.metric("roc_auc").unwrap_or(0.0);
                auc(a).partial_cmp(&auc(b)).unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}

/// Write the training report as pretty-printed JSON
pub fn export_training_report(report: &TrainingReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize training report")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write training report: {}", output_path.display()))?;

    Ok(())
}

/// Read a previously exported training report
pub fn load_training_report(path: &Path) -> Result<TrainingReport> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read training report: {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse training report: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{classification_metrics, EvaluationOutcome};
    use tempfile::TempDir;

    fn sample_report() -> TrainingReport {
        TrainingReport {
            metadata: RunMetadata {
                timestamp: "2026-01-01T00:00:00+00:00".to_string(),
                credrisk_version: "0.1.0".to_string(),
                input_file: "loans.csv".to_string(),
                seed: 42,
                holdout_fraction: 0.2,
                threshold: 0.5,
                smote_k_neighbors: 5,
                smote_target_ratio: 1.0,
            },
            dataset: DatasetSummary {
                loaded_rows: 10,
                dropped_rows: 0,
                train_rows: 8,
                holdout_rows: 2,
                features: 3,
                train_before_resampling: (6, 2).into(),
                train_after_resampling: (6, 6).into(),
                synthetic_rows: 4,
            },
            missing_values: vec![MissingValueEntry {
                column: "loan_int_rate".to_string(),
                ratio: 0.1,
            }],
            evaluations: vec![
                EvaluationRecord {
                    model: "logistic_regression".to_string(),
                    outcome: EvaluationOutcome::Scored(classification_metrics(&[0.6, 0.4], &[0, 1], 0.5)),
                },
                EvaluationRecord {
                    model: "xgboost".to_string(),
                    outcome: EvaluationOutcome::Scored(classification_metrics(&[0.9, 0.1], &[1, 0], 0.5)),
                },
            ],
            failures: vec![TrainingFailure::new("random_forest", "training set is empty")],
            importance: Vec::new(),
        }
    }

    #[test]
    fn test_best_model_by_auc() {
        let report = sample_report();
        assert_eq!(report.best_model().map(|r| r.model.as_str()), Some("xgboost"));
    }

    #[test]
    fn test_export_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("training_report.json");
        let report = sample_report();
        export_training_report(&report, &path).unwrap();

        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"status\": \"scored\""));
        assert_eq!(load_training_report(&path).unwrap(), report);
    }
}
