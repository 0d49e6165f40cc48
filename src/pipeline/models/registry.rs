//! Trains every classifier variant on the shared resampled set
//!
//! Variants run on rayon workers and never share mutable state. A variant that
//! fails to fit becomes a [`TrainingFailure`] and the rest carry on.

use rayon::prelude::*;

use super::{
    BoostedTrees, BoostingParams, ClassifierModel, FitError, ForestParams, LogisticParams,
    LogisticRegression, ModelKind, RandomForest, TrainedModel,
};
use crate::pipeline::error::{PipelineError, PipelineResult, TrainingFailure};
use crate::pipeline::matrix::Matrix;
use crate::pipeline::resample::ResampledTrainingSet;

/// Models that trained, in registry order, plus the variants that did not
#[derive(Debug, Clone)]
pub struct RegistryOutcome {
    pub models: Vec<TrainedModel>,
    pub failures: Vec<TrainingFailure>,
}

impl RegistryOutcome {
    pub fn get(&self, kind: ModelKind) -> Option<&TrainedModel> {
        self.models.iter().find(|m| m.kind() == kind)
    }
}

/// Train all variants with their fixed hyperparameters.
///
/// `feature_names` binds each model to the fitted schema; `background` is
/// stored on every model for the sampling explainer. Width disagreements
/// between the set, the schema and the background are structural errors.
pub fn train_all(
    set: &ResampledTrainingSet,
    feature_names: &[String],
    background: &Matrix,
    seed: u64,
) -> PipelineResult<RegistryOutcome> {
    set.matrix.ensure_width(feature_names.len())?;
    background.ensure_width(feature_names.len())?;
    if set.matrix.n_rows() != set.labels.len() {
        return Err(PipelineError::SchemaMismatch {
            expected: set.matrix.n_rows(),
            found: set.labels.len(),
        });
    }

    // Indexed parallel collect keeps registry order
    let results: Vec<(ModelKind, Result<ClassifierModel, FitError>)> = ModelKind::ALL
        .par_iter()
        .map(|&kind| (kind, fit_variant(kind, &set.matrix, &set.labels, seed)))
        .collect();

    let mut models = Vec::new();
    let mut failures = Vec::new();
    for (kind, result) in results {
        match result {
            Ok(model) => models.push(TrainedModel::new(
                kind,
                seed,
                feature_names.to_vec(),
                model,
                background.clone(),
            )),
            Err(e) => failures.push(TrainingFailure::new(kind.key(), e.to_string())),
        }
    }

    Ok(RegistryOutcome { models, failures })
}

fn fit_variant(kind: ModelKind, x: &Matrix, labels: &[u8], seed: u64) -> Result<ClassifierModel, FitError> {
    match kind {
        ModelKind::LogisticRegression => {
            LogisticRegression::fit(x, labels, &LogisticParams::default()).map(ClassifierModel::Logistic)
        }
        ModelKind::RandomForest => {
            RandomForest::fit(x, labels, &ForestParams::default(), seed).map(ClassifierModel::Forest)
        }
        ModelKind::Xgboost => {
            BoostedTrees::fit(x, labels, &BoostingParams::default(), seed).map(ClassifierModel::Boosted)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::models::Classifier;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{}", i)).collect()
    }

    #[test]
    fn test_single_class_fails_every_variant() {
        let matrix = Matrix::from_rows((0..10).map(|i| vec![i as f64]).collect()).unwrap();
        let set = ResampledTrainingSet::unchanged(matrix.clone(), vec![0; 10]);
        let outcome = train_all(&set, &names(1), &matrix, 42).unwrap();

        assert!(outcome.models.is_empty());
        let failed: Vec<&str> = outcome.failures.iter().map(|f| f.model.as_str()).collect();
        assert_eq!(failed, vec!["logistic_regression", "random_forest", "xgboost"]);
    }

    #[test]
    fn test_models_return_in_registry_order() {
        let rows: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64 / 4.0, (i % 3) as f64]).collect();
        let labels: Vec<u8> = (0..40).map(|i| (i >= 20) as u8).collect();
        let matrix = Matrix::from_rows(rows).unwrap();
        let set = ResampledTrainingSet::unchanged(matrix.clone(), labels);

        let outcome = train_all(&set, &names(2), &matrix, 42).unwrap();
        assert!(outcome.failures.is_empty());
        let order: Vec<&str> = outcome.models.iter().map(|m| m.name()).collect();
        assert_eq!(order, vec!["logistic_regression", "random_forest", "xgboost"]);
        assert!(outcome.get(ModelKind::Xgboost).is_some());
    }

    #[test]
    fn test_schema_width_mismatch_is_structural() {
        let matrix = Matrix::from_rows(vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
        let set = ResampledTrainingSet::unchanged(matrix.clone(), vec![0, 1]);
        assert!(matches!(
            train_all(&set, &names(3), &matrix, 1),
            Err(PipelineError::SchemaMismatch { expected: 3, found: 2 })
        ));
    }
}
