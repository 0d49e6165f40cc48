//! Holdout evaluation of trained classifiers
//!
//! ROC-AUC uses the Mann-Whitney rank statistic with tie averaging. Threshold
//! metrics count a probability strictly greater than the threshold as a
//! predicted default. Any zero denominator yields 0.

use serde::{Deserialize, Serialize};

use super::error::{PipelineError, PipelineResult};
use super::matrix::Matrix;
use super::models::Classifier;

/// Default decision threshold on predicted probability
pub const DEFAULT_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_positives: usize,
}

impl ConfusionMatrix {
    pub fn total(&self) -> usize {
        self.true_negatives + self.false_positives + self.false_negatives + self.true_positives
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub roc_auc: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub accuracy: f64,
    pub confusion: ConfusionMatrix,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EvaluationOutcome {
    Scored(ClassificationMetrics),
    Skipped { reason: String },
}

/// Evaluation result for one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub model: String,
    pub outcome: EvaluationOutcome,
}

impl EvaluationRecord {
    pub fn metrics(&self) -> Option<&ClassificationMetrics> {
        match &self.outcome {
            EvaluationOutcome::Scored(m) => Some(m),
            EvaluationOutcome::Skipped { .. } => None,
        }
    }

    /// Look up a metric by name (`roc_auc`, `precision`, `recall`, `f1`, `accuracy`)
    pub fn metric(&self, name: &str) -> Option<f64> {
        let m = self.metrics()?;
        match name {
            "roc_auc" => Some(m.roc_auc),
            "precision" => Some(m.precision),
            "recall" => Some(m.recall),
            "f1" => Some(m.f1),
            "accuracy" => Some(m.accuracy),
            _ => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, EvaluationOutcome::Skipped { .. })
    }
}

/// Score each model against the holdout set, preserving model order.
pub fn evaluate<M: Classifier>(
    models: &[M],
    holdout: &Matrix,
    labels: &[u8],
    threshold: f64,
) -> PipelineResult<Vec<EvaluationRecord>> {
    if holdout.n_rows() != labels.len() {
        return Err(PipelineError::SchemaMismatch {
            expected: holdout.n_rows(),
            found: labels.len(),
        });
    }

    let mut records = Vec::with_capacity(models.len());
    for model in models {
        holdout.ensure_width(model.n_features())?;

        let outcome = if holdout.n_rows() == 0 {
            EvaluationOutcome::Skipped {
                reason: "empty holdout".to_string(),
            }
        } else if !model.has_probability_output() {
            EvaluationOutcome::Skipped {
                reason: "model does not produce probability output".to_string(),
            }
        } else {
            let probabilities = model.predict_proba(holdout);
            if probabilities.iter().any(|p| !p.is_finite()) {
                EvaluationOutcome::Skipped {
                    reason: "model produced non-finite probabilities".to_string(),
                }
            } else {
                EvaluationOutcome::Scored(classification_metrics(&probabilities, labels, threshold))
            }
        };

        records.push(EvaluationRecord {
            model: model.name().to_string(),
            outcome,
        });
    }

    Ok(records)
}

/// Threshold metrics plus ROC-AUC for one set of predictions
pub fn classification_metrics(probabilities: &[f64], labels: &[u8], threshold: f64) -> ClassificationMetrics {
    let mut confusion = ConfusionMatrix::default();
    for (&p, &label) in probabilities.iter().zip(labels) {
        match (p > threshold, label == 1) {
            (true, true) => confusion.true_positives += 1,
            (true, false) => confusion.false_positives += 1,
            (false, true) => confusion.false_negatives += 1,
            (false, false) => confusion.true_negatives += 1,
        }
    }

    let tp = confusion.true_positives as f64;
    let precision = safe_ratio(tp, tp + confusion.false_positives as f64);
    let recall = safe_ratio(tp, tp + confusion.false_negatives as f64);
    let f1 = safe_ratio(2.0 * precision * recall, precision + recall);
    let accuracy = safe_ratio(
        (confusion.true_positives + confusion.true_negatives) as f64,
        confusion.total() as f64,
    );

    ClassificationMetrics {
        roc_auc: roc_auc(probabilities, labels),
        precision,
        recall,
        f1,
        accuracy,
        confusion,
    }
}

fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Area under the ROC curve via the Mann-Whitney U statistic.
///
/// Tied scores share their average rank. Returns 0.5 when either class is
/// absent.
pub fn roc_auc(scores: &[f64], labels: &[u8]) -> f64 {
    let mut pairs: Vec<(f64, bool)> = scores
        .iter()
        .zip(labels)
        .map(|(&s, &l)| (s, l == 1))
        .collect();

    let n_pos = pairs.iter().filter(|(_, pos)| *pos).count() as f64;
    let n_neg = pairs.len() as f64 - n_pos;
    if n_pos == 0.0 || n_neg == 0.0 {
        return 0.5;
    }

    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let n = pairs.len();
    let mut rank_sum_pos = 0.0;
    let mut i = 0;
    while i < n {
        let current = pairs[i].0;
        let mut j = i;
        while j < n && pairs[j].0 == current {
            j += 1;
        }

        // 1-based ranks i+1..=j share their mean
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        let positives_in_group = pairs[i..j].iter().filter(|(_, pos)| *pos).count() as f64;
        rank_sum_pos += avg_rank * positives_in_group;
        i = j;
    }

    let u = rank_sum_pos - n_pos * (n_pos + 1.0) / 2.0;
    u / (n_pos * n_neg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_separation_two_rows() {
        let metrics = classification_metrics(&[1.0, 0.0], &[1, 0], DEFAULT_THRESHOLD);
        assert_eq!(metrics.roc_auc, 1.0);
        assert_eq!(metrics.precision, 1.0);
        assert_eq!(metrics.recall, 1.0);
        assert_eq!(metrics.f1, 1.0);
        assert_eq!(metrics.accuracy, 1.0);
    }

    #[test]
    fn test_auc_with_ties() {
        // One positive tied with one negative counts as half a correct pair
        assert_eq!(roc_auc(&[0.5, 0.5], &[1, 0]), 0.5);
        let auc = roc_auc(&[0.1, 0.4, 0.4, 0.8], &[0, 0, 1, 1]);
        assert!((auc - 0.875).abs() < 1e-12);
    }

    #[test]
    fn test_auc_inverted_and_single_class() {
        assert_eq!(roc_auc(&[0.9, 0.1], &[0, 1]), 0.0);
        assert_eq!(roc_auc(&[0.9, 0.1], &[1, 1]), 0.5);
    }

    #[test]
    fn test_threshold_is_strict() {
        let metrics = classification_metrics(&[0.5, 0.5], &[1, 0], 0.5);
        assert_eq!(metrics.confusion.true_positives, 0);
        assert_eq!(metrics.confusion.false_negatives, 1);
        // No predicted positives: precision and F1 fall back to 0
        assert_eq!(metrics.precision, 0.0);
        assert_eq!(metrics.f1, 0.0);
    }

    #[test]
    fn test_metric_lookup() {
        let record = EvaluationRecord {
            model: "m".to_string(),
            outcome: EvaluationOutcome::Scored(classification_metrics(&[0.9, 0.1], &[1, 0], 0.5)),
        };
        assert_eq!(record.metric("roc_auc"), Some(1.0));
        assert_eq!(record.metric("log_loss"), None);
        assert!(!record.is_skipped());
    }
}
