//! Dataset loader for CSV and Parquet applicant files

use std::path::Path;

use polars::prelude::*;

use super::error::{PipelineError, PipelineResult};
use super::record::{
    ApplicantRecord, CategoricalAttribute, LabeledDataset, NumericAttribute, LABEL_COLUMN,
};
use super::target::{resolve_labels, TargetMapping};

/// Shape information reported after loading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadStats {
    pub rows: usize,
    pub columns: usize,
    /// Rows dropped because their label was null or unmapped
    pub dropped_rows: usize,
    pub memory_mb: f64,
}

/// Load a file (CSV or Parquet based on extension) into a DataFrame
pub fn load_dataframe(path: &Path, infer_schema_length: usize) -> PipelineResult<DataFrame> {
    if !path.exists() {
        return Err(PipelineError::DataLoad(format!(
            "file not found: {}",
            path.display()
        )));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(schema_length)
            .finish(),
        "parquet" => LazyFrame::scan_parquet(path, Default::default()),
        _ => {
            return Err(PipelineError::DataLoad(format!(
                "unsupported file format: '{}'. Supported formats: csv, parquet",
                extension
            )))
        }
    };

    lf.and_then(|lf| lf.collect()).map_err(|e| {
        PipelineError::DataLoad(format!("failed to read {}: {}", path.display(), e))
    })
}

/// Load labeled applicant records from a CSV or Parquet file.
///
/// Fails with [`PipelineError::DataLoad`] when the file is missing, the
/// `loan_status` column is absent, or any attribute column is absent.
/// A `loan_percent_income` column in the file is ignored; the ratio is always
/// derived from loan amount and income.
pub fn load_labeled_dataset(
    path: &Path,
    mapping: Option<&TargetMapping>,
    infer_schema_length: usize,
) -> PipelineResult<(LabeledDataset, LoadStats)> {
    let df = load_dataframe(path, infer_schema_length)?;
    let (rows, columns) = df.shape();
    let dataset = records_from_frame(&df, mapping)?;

    let stats = LoadStats {
        rows,
        columns,
        dropped_rows: rows - dataset.len(),
        memory_mb: df.estimated_size() as f64 / (1024.0 * 1024.0),
    };

    if stats.dropped_rows > 0 {
        eprintln!(
            "Warning: {} row(s) with a null or unmapped '{}' value were dropped",
            stats.dropped_rows, LABEL_COLUMN
        );
    }

    Ok((dataset, stats))
}

/// Convert a DataFrame into labeled applicant records
pub fn records_from_frame(
    df: &DataFrame,
    mapping: Option<&TargetMapping>,
) -> PipelineResult<LabeledDataset> {
    let present: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    if !present.iter().any(|c| c == LABEL_COLUMN) {
        return Err(PipelineError::DataLoad(format!(
            "label column '{}' not found. Available columns: {:?}",
            LABEL_COLUMN, present
        )));
    }

    let required = NumericAttribute::ALL
        .iter()
        .filter(|a| !a.is_derived())
        .map(|a| a.column())
        .chain(CategoricalAttribute::ALL.iter().map(|a| a.column()));
    let missing: Vec<&str> = required
        .filter(|c| !present.iter().any(|p| p == c))
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::DataLoad(format!(
            "attribute column(s) missing from dataset: {:?}",
            missing
        )));
    }

    if df.height() == 0 {
        return Err(PipelineError::DataLoad("dataset has no rows".to_string()));
    }

    let labels = resolve_labels(df, LABEL_COLUMN, mapping)?;
    let mut records = vec![ApplicantRecord::default(); df.height()];

    for attribute in NumericAttribute::ALL.iter().filter(|a| !a.is_derived()) {
        let values = numeric_column(df, attribute.column())?;
        for (record, value) in records.iter_mut().zip(values) {
            record.set_numeric(*attribute, value);
        }
    }

    for attribute in CategoricalAttribute::ALL {
        let values = string_column(df, attribute.column())?;
        for (record, value) in records.iter_mut().zip(values) {
            record.set_categorical(attribute, value);
        }
    }

    let (records, labels): (Vec<ApplicantRecord>, Vec<u8>) = records
        .into_iter()
        .zip(labels)
        .filter_map(|(record, label)| label.map(|l| (record, l)))
        .unzip();

    if records.is_empty() {
        return Err(PipelineError::DataLoad(format!(
            "no rows with a valid '{}' value",
            LABEL_COLUMN
        )));
    }

    LabeledDataset::new(records, labels)
}

fn numeric_column(df: &DataFrame, name: &str) -> PipelineResult<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .and_then(|c| c.cast(&DataType::Float64))
        .map_err(|e| PipelineError::DataLoad(format!("column '{}': {}", name, e)))?;
    let values = column
        .f64()
        .map_err(|e| PipelineError::DataLoad(format!("column '{}': {}", name, e)))?;
    Ok(values.into_iter().collect())
}

fn string_column(df: &DataFrame, name: &str) -> PipelineResult<Vec<Option<String>>> {
    let column = df
        .column(name)
        .and_then(|c| c.cast(&DataType::String))
        .map_err(|e| PipelineError::DataLoad(format!("column '{}': {}", name, e)))?;
    let values = column
        .str()
        .map_err(|e| PipelineError::DataLoad(format!("column '{}': {}", name, e)))?;
    Ok(values.into_iter().map(|v| v.map(|s| s.to_string())).collect())
}
