//! Additive per-feature attributions of a model's raw output
//!
//! Tree ensembles use exact TreeSHAP; every other model uses permutation
//! sampling against its stored background rows. Either way
//! `base_value + Σ contribution ≈ raw_output(x)`.

pub mod sampling;
pub mod tree_shap;

use serde::{Deserialize, Serialize};

use super::error::PipelineResult;
use super::matrix::Matrix;
use super::models::{Classifier, ClassifierModel, TrainedModel};
pub use sampling::{SamplingExplainer, DEFAULT_PERMUTATIONS};
pub use tree_shap::TreeExplainer;

/// Attribution strategy
pub trait Explainer {
    /// Expected raw output with no feature information
    fn base_value(&self) -> f64;

    /// Signed contribution of every feature to `raw_output(x) - base_value`
    fn contributions(&self, x: &[f64]) -> Vec<f64>;
}

/// One feature's share of a prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    pub feature: String,
    /// Transformed (scaled / encoded) feature value
    pub value: f64,
    pub contribution: f64,
    pub base_value: f64,
}

/// Mean absolute contribution of a feature over many rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub mean_abs_contribution: f64,
}

/// Pick the strategy for a model by its family tag
pub fn explainer_for(model: &TrainedModel) -> Box<dyn Explainer + '_> {
    match model.model() {
        ClassifierModel::Forest(forest) => Box::new(TreeExplainer::for_forest(forest)),
        ClassifierModel::Boosted(boosted) => Box::new(TreeExplainer::for_boosted(boosted)),
        ClassifierModel::Logistic(_) => Box::new(SamplingExplainer::new(
            model.model(),
            model.background(),
            model.seed(),
        )),
    }
}

/// Attribute one transformed instance
pub fn explain(model: &TrainedModel, instance: &[f64]) -> PipelineResult<Vec<Attribution>> {
    Matrix::from_row(instance).ensure_width(model.n_features())?;
    let explainer = explainer_for(model);
    Ok(attribute(model, explainer.as_ref(), instance))
}

/// Attribute every row of a matrix. A one-row matrix gives the same result as
/// [`explain`] on that row.
pub fn explain_rows(model: &TrainedModel, matrix: &Matrix) -> PipelineResult<Vec<Vec<Attribution>>> {
    matrix.ensure_width(model.n_features())?;
    let explainer = explainer_for(model);
    Ok(matrix
        .rows()
        .map(|row| attribute(model, explainer.as_ref(), row))
        .collect())
}

fn attribute(model: &TrainedModel, explainer: &dyn Explainer, x: &[f64]) -> Vec<Attribution> {
    let base_value = explainer.base_value();
    explainer
        .contributions(x)
        .into_iter()
        .zip(model.feature_names())
        .zip(x)
        .map(|((contribution, feature), &value)| Attribution {
            feature: feature.clone(),
            value,
            contribution,
            base_value,
        })
        .collect()
}

/// Mean |contribution| per feature over up to `max_rows` rows, largest first
pub fn global_importance(
    model: &TrainedModel,
    matrix: &Matrix,
    max_rows: usize,
) -> PipelineResult<Vec<FeatureImportance>> {
    matrix.ensure_width(model.n_features())?;
    let n = matrix.n_rows().min(max_rows);
    let explainer = explainer_for(model);

    let mut totals = vec![0.0; model.n_features()];
    for row in matrix.rows().take(n) {
        for (total, c) in totals.iter_mut().zip(explainer.contributions(row)) {
            *total += c.abs();
        }
    }

    let mut importance: Vec<FeatureImportance> = model
        .feature_names()
        .iter()
        .zip(totals)
        .map(|(feature, total)| FeatureImportance {
            feature: feature.clone(),
            mean_abs_contribution: if n > 0 { total / n as f64 } else { 0.0 },
        })
        .collect();

    importance.sort_by(|a, b| {
        b.mean_abs_contribution
            .partial_cmp(&a.mean_abs_contribution)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(importance)
}
