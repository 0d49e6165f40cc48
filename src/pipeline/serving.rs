//! Serving side: load artifacts once, then transform, predict and explain
//!
//! A [`RiskEngine`] holds its fitted state behind `Arc`s and never mutates it,
//! so clones can be handed to any number of threads.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::{PipelineError, PipelineResult};
use super::explain::{self, Attribution};
use super::matrix::Matrix;
use super::models::{Classifier, ModelKind, TrainedModel};
use super::record::ApplicantRecord;
use super::store::{ArtifactStore, PREPROCESSOR_KEY};
use super::transform::FittedTransformer;

/// Risk bands on the 0-100 score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    /// LOW below 30, MEDIUM up to 70, HIGH from 70
    pub fn from_score(score: f64) -> Self {
        if score < 30.0 {
            RiskBand::Low
        } else if score < 70.0 {
            RiskBand::Medium
        } else {
            RiskBand::High
        }
    }

    /// Band of a probability as the score is displayed (two decimals), so a
    /// printed "30.00" is never LOW
    pub fn from_probability(probability: f64) -> Self {
        let displayed = (probability * 100.0 * 100.0).round() / 100.0;
        Self::from_score(displayed)
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            RiskBand::Low => "Applicant is likely to repay. Approval Recommended.",
            RiskBand::Medium => "Moderate risk. Manual review advised.",
            RiskBand::High => "High risk of default. Rejection Recommended.",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskBand::Low => "LOW",
            RiskBand::Medium => "MEDIUM",
            RiskBand::High => "HIGH",
        };
        f.write_str(label)
    }
}

/// Scored and explained applicant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub model: String,
    pub probability: f64,
    /// Probability of default scaled to 0-100
    pub score: f64,
    pub band: RiskBand,
    pub recommendation: String,
    pub attributions: Vec<Attribution>,
}

#[derive(Debug, Clone, Default)]
pub struct RiskEngine {
    preprocessor: Option<Arc<FittedTransformer>>,
    model: Option<Arc<TrainedModel>>,
}

impl RiskEngine {
    /// Engine with nothing loaded; every request fails until artifacts are attached
    pub fn empty() -> Self {
        Self::default()
    }

    /// Bind a preprocessor to a model trained on its schema.
    ///
    /// Width and every feature name must match; equal widths from different
    /// category vocabularies are rejected.
    pub fn new(preprocessor: FittedTransformer, model: TrainedModel) -> PipelineResult<Self> {
        let names = preprocessor.schema().names();
        if names.len() != model.n_features() {
            return Err(PipelineError::SchemaMismatch {
                expected: model.n_features(),
                found: names.len(),
            });
        }
        if let Some((index, (expected, found))) = model
            .feature_names()
            .iter()
            .zip(names)
            .enumerate()
            .find(|(_, (expected, found))| expected != found)
        {
            return Err(PipelineError::FeatureNameMismatch {
                index,
                expected: expected.clone(),
                found: found.clone(),
            });
        }
        Ok(Self {
            preprocessor: Some(Arc::new(preprocessor)),
            model: Some(Arc::new(model)),
        })
    }

    /// Load the preprocessor and one model from `<dir>/<key>.json`
    pub fn load(dir: &Path, kind: ModelKind) -> PipelineResult<Self> {
        let store = ArtifactStore::new(dir);
        let preprocessor: FittedTransformer = store.load(PREPROCESSOR_KEY)?;
        let model: TrainedModel = store.load(kind.key())?;
        Self::new(preprocessor, model)
    }

    pub fn model(&self) -> Option<&TrainedModel> {
        self.model.as_deref()
    }

    fn require_preprocessor(&self) -> PipelineResult<&FittedTransformer> {
        self.preprocessor
            .as_deref()
            .ok_or_else(|| PipelineError::NotFitted("no preprocessor has been loaded".to_string()))
    }

    fn require_model(&self) -> PipelineResult<&TrainedModel> {
        self.model.as_deref().ok_or_else(|| PipelineError::MissingArtifact {
            key: "model".to_string(),
            path: "<not loaded>".to_string(),
        })
    }

    pub fn transform(&self, records: &[ApplicantRecord]) -> PipelineResult<Matrix> {
        Ok(self.require_preprocessor()?.transform(records))
    }

    /// Default probabilities, one per record
    pub fn predict(&self, records: &[ApplicantRecord]) -> PipelineResult<Vec<f64>> {
        let model = self.require_model()?;
        let matrix = self.transform(records)?;
        matrix.ensure_width(model.n_features())?;
        Ok(model.predict_proba(&matrix))
    }

    pub fn explain(&self, record: &ApplicantRecord) -> PipelineResult<Vec<Attribution>> {
        let model = self.require_model()?;
        let row = self.require_preprocessor()?.transform_record(record);
        explain::explain(model, &row)
    }

    /// Probability, band, recommendation and attributions for one applicant
    pub fn assess(&self, record: &ApplicantRecord) -> PipelineResult<RiskAssessment> {
        let model = self.require_model()?;
        let row = self.require_preprocessor()?.transform_record(record);
        Matrix::from_row(&row).ensure_width(model.n_features())?;

        let probability = model.predict_proba_row(&row);
        let score = probability * 100.0;
        let band = RiskBand::from_probability(probability);

        Ok(RiskAssessment {
            model: model.name().to_string(),
            probability,
            score,
            band,
            recommendation: band.recommendation().to_string(),
            attributions: explain::explain(model, &row)?,
        })
    }
}
