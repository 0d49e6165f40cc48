//! Feature transformation: imputation, standardization and one-hot encoding
//!
//! Fitting captures every statistic into an immutable [`FittedTransformer`].
//! `transform` reads only that fitted state, so the same batch always yields a
//! bit-identical matrix and serving never recomputes anything from new data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::{PipelineError, PipelineResult};
use super::matrix::Matrix;
use super::record::{ApplicantRecord, CategoricalAttribute, NumericAttribute};

/// Ordered transformed feature names, fixed once fitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    feature_names: Vec<String>,
}

impl FeatureSchema {
    pub fn new(feature_names: Vec<String>) -> Self {
        Self { feature_names }
    }

    pub fn len(&self) -> usize {
        self.feature_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feature_names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|n| n == name)
    }
}

/// Fitted statistics for one numeric column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub attribute: NumericAttribute,
    pub median: f64,
    pub mean: f64,
    /// Population standard deviation after imputation; 0 means centering only
    pub std_dev: f64,
}

impl NumericStats {
    fn apply(&self, value: Option<f64>) -> f64 {
        let centered = value.unwrap_or(self.median) - self.mean;
        if self.std_dev > 0.0 {
            centered / self.std_dev
        } else {
            centered
        }
    }
}

/// Fitted vocabulary for one categorical column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalStats {
    pub attribute: CategoricalAttribute,
    /// Most frequent training category; `None` when the column was never observed
    pub mode: Option<String>,
    /// Sorted observed categories, one indicator column each
    pub categories: Vec<String>,
}

impl CategoricalStats {
    fn encode_into(&self, value: Option<&str>, out: &mut Vec<f64>) {
        let value = value.or(self.mode.as_deref());
        // Unseen (or unimputable) values leave the whole block at zero
        let hot = value.and_then(|v| self.categories.binary_search_by(|c| c.as_str().cmp(v)).ok());
        out.extend((0..self.categories.len()).map(|i| if Some(i) == hot { 1.0 } else { 0.0 }));
    }
}

/// Fits the column-wise transformation on training records
pub struct FeatureTransformer;

impl FeatureTransformer {
    /// Learn medians, means, standard deviations, modes and category
    /// vocabularies from `records`.
    pub fn fit(records: &[ApplicantRecord]) -> PipelineResult<FittedTransformer> {
        if records.is_empty() {
            return Err(PipelineError::EmptyDataset(
                "cannot fit the feature transformer on zero records".to_string(),
            ));
        }

        let numeric: Vec<NumericStats> = NumericAttribute::ALL
            .iter()
            .map(|&attribute| fit_numeric(records, attribute))
            .collect();

        let categorical: Vec<CategoricalStats> = CategoricalAttribute::ALL
            .iter()
            .map(|&attribute| fit_categorical(records, attribute))
            .collect();

        let mut feature_names: Vec<String> = numeric
            .iter()
            .map(|s| s.attribute.column().to_string())
            .collect();
        for stats in &categorical {
            for category in &stats.categories {
                feature_names.push(format!("{}_{}", stats.attribute.column(), category));
            }
        }

        Ok(FittedTransformer {
            schema: FeatureSchema::new(feature_names),
            numeric,
            categorical,
        })
    }
}

fn fit_numeric(records: &[ApplicantRecord], attribute: NumericAttribute) -> NumericStats {
    let mut observed: Vec<f64> = records.iter().filter_map(|r| r.numeric(attribute)).collect();

    if observed.is_empty() {
        eprintln!(
            "Warning: column '{}' has no observed values, imputing 0",
            attribute.column()
        );
    }

    observed.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = median_of_sorted(&observed);

    let n = records.len() as f64;
    let imputed = || records.iter().map(|r| r.numeric(attribute).unwrap_or(median));
    let mean = imputed().sum::<f64>() / n;
    let variance = imputed().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;

    NumericStats {
        attribute,
        median,
        mean,
        std_dev: variance.sqrt(),
    }
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    match sorted.len() {
        0 => 0.0,
        n if n % 2 == 1 => sorted[n / 2],
        n => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
    }
}

fn fit_categorical(records: &[ApplicantRecord], attribute: CategoricalAttribute) -> CategoricalStats {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in records.iter().filter_map(|r| r.categorical(attribute)) {
        *counts.entry(value).or_insert(0) += 1;
    }

    // BTreeMap iterates in sorted order, so ties resolve to the smallest category
    let mut mode: Option<(&str, usize)> = None;
    for (&category, &count) in &counts {
        if mode.map_or(true, |(_, best)| count > best) {
            mode = Some((category, count));
        }
    }

    if mode.is_none() {
        eprintln!(
            "Warning: column '{}' has no observed categories, encoding as all-zero",
            attribute.column()
        );
    }

    CategoricalStats {
        attribute,
        mode: mode.map(|(c, _)| c.to_string()),
        categories: counts.keys().map(|c| c.to_string()).collect(),
    }
}

/// Immutable fitted preprocessing state; persisted under the `preprocessor` key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedTransformer {
    schema: FeatureSchema,
    numeric: Vec<NumericStats>,
    categorical: Vec<CategoricalStats>,
}

impl FittedTransformer {
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn numeric_stats(&self) -> &[NumericStats] {
        &self.numeric
    }

    pub fn categorical_stats(&self) -> &[CategoricalStats] {
        &self.categorical
    }

    /// Transform one record into a feature vector matching the schema
    pub fn transform_record(&self, record: &ApplicantRecord) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.schema.len());
        row.extend(self.numeric.iter().map(|s| s.apply(record.numeric(s.attribute))));
        for stats in &self.categorical {
            stats.encode_into(record.categorical(stats.attribute), &mut row);
        }
        row
    }

    /// Transform a batch of records. Never fails on unseen categories.
    pub fn transform(&self, records: &[ApplicantRecord]) -> Matrix {
        let mut matrix = Matrix::zeros(0, self.schema.len());
        for record in records {
            matrix.push_row(&self.transform_record(record));
        }
        matrix
    }
}
