//! Default label detection and mapping
//!
//! The `loan_status` column is usually already 0/1, but exported datasets
//! sometimes carry strings such as "Default"/"Paid". Those need an explicit
//! event/non-event mapping before training.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::{PipelineError, PipelineResult};

/// Tolerance for floating point comparison when checking binary 0/1 values
const TOLERANCE: f64 = 1e-9;

/// Mapping from raw label values to the binary default label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetMapping {
    /// Value that maps to 1 (default)
    pub event_value: String,
    /// Value that maps to 0 (repaid)
    pub non_event_value: String,
}

impl TargetMapping {
    pub fn new(event_value: String, non_event_value: String) -> Self {
        Self {
            event_value,
            non_event_value,
        }
    }
}

/// Result of analyzing the label column
#[derive(Debug, Clone)]
pub enum TargetAnalysis {
    /// Label column is already binary 0/1
    AlreadyBinary,
    /// Label column needs a mapping; contains these unique values
    NeedsMapping { unique_values: Vec<String> },
}

fn label_column<'a>(df: &'a DataFrame, target: &str) -> PipelineResult<&'a Column> {
    df.column(target).map_err(|_| {
        PipelineError::DataLoad(format!("label column '{}' not found in dataset", target))
    })
}

fn polars_err(e: PolarsError) -> PipelineError {
    PipelineError::DataLoad(e.to_string())
}

/// Determine whether the label column is binary 0/1 or needs a mapping
pub fn analyze_target_column(df: &DataFrame, target: &str) -> PipelineResult<TargetAnalysis> {
    let target_col = label_column(df, target)?;

    if target_col.len() == 0 {
        return Err(PipelineError::DataLoad(format!("label column '{}' is empty", target)));
    }
    if target_col.null_count() == target_col.len() {
        return Err(PipelineError::DataLoad(format!(
            "label column '{}' contains only null values",
            target
        )));
    }

    if target_col.dtype().is_primitive_numeric() {
        let float_col = target_col.cast(&DataType::Float64).map_err(polars_err)?;
        let unique = float_col.unique().map_err(polars_err)?;
        let unique_values: Vec<f64> = unique
            .f64()
            .map_err(polars_err)?
            .into_iter()
            .flatten()
            .collect();

        let is_binary = unique_values.len() <= 2
            && unique_values
                .iter()
                .all(|&v| v.abs() < TOLERANCE || (v - 1.0).abs() < TOLERANCE);

        if is_binary {
            return Ok(TargetAnalysis::AlreadyBinary);
        }
    }

    let mut unique_values: Vec<String> = column_to_string_vec(target_col)?
        .into_iter()
        .flatten()
        .collect();
    unique_values.sort();
    unique_values.dedup();

    Ok(TargetAnalysis::NeedsMapping { unique_values })
}

/// Resolve the label column to `Some(0|1)` per row.
///
/// Rows whose label is null or matches neither side of the mapping are `None`
/// and get dropped by the loader.
pub fn resolve_labels(
    df: &DataFrame,
    target: &str,
    mapping: Option<&TargetMapping>,
) -> PipelineResult<Vec<Option<u8>>> {
    match (analyze_target_column(df, target)?, mapping) {
        (_, Some(mapping)) => create_target_mask(df, target, mapping),
        (TargetAnalysis::AlreadyBinary, None) => {
            let col = label_column(df, target)?
                .cast(&DataType::Float64)
                .map_err(polars_err)?;
            Ok(col
                .f64()
                .map_err(polars_err)?
                .into_iter()
                .map(|v| v.map(|x| if (x - 1.0).abs() < TOLERANCE { 1 } else { 0 }))
                .collect())
        }
        (TargetAnalysis::NeedsMapping { unique_values }, None) => Err(PipelineError::DataLoad(format!(
            "label column '{}' is not binary 0/1 (found {:?}); supply --event-value and --non-event-value",
            target, unique_values
        ))),
    }
}

/// Map label values to 1 (event), 0 (non-event) or `None` (unmatched)
pub fn create_target_mask(
    df: &DataFrame,
    target: &str,
    mapping: &TargetMapping,
) -> PipelineResult<Vec<Option<u8>>> {
    let string_values = column_to_string_vec(label_column(df, target)?)?;

    Ok(string_values
        .iter()
        .map(|v| match v {
            Some(s) if s == &mapping.event_value => Some(1),
            Some(s) if s == &mapping.non_event_value => Some(0),
            _ => None,
        })
        .collect())
}

/// Render a column as optional strings for comparison against a mapping
fn column_to_string_vec(col: &Column) -> PipelineResult<Vec<Option<String>>> {
    let values: Vec<Option<String>> = match col.dtype() {
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => {
            let cast = col.cast(&DataType::Int64).map_err(polars_err)?;
            cast.i64()
                .map_err(polars_err)?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
            let cast = col.cast(&DataType::UInt64).map_err(polars_err)?;
            cast.u64()
                .map_err(polars_err)?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::Float32 | DataType::Float64 => {
            let cast = col.cast(&DataType::Float64).map_err(polars_err)?;
            cast.f64()
                .map_err(polars_err)?
                .into_iter()
                .map(|v| v.map(|n| format!("{}", n)))
                .collect()
        }
        _ => {
            let cast = col.cast(&DataType::String).map_err(polars_err)?;
            cast.str()
                .map_err(polars_err)?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()
        }
    };

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_binary_int_label() {
        let df = df! {
            "loan_status" => [0i32, 1, 0, 1, 0, 1],
        }
        .unwrap();

        let result = analyze_target_column(&df, "loan_status").unwrap();
        assert!(matches!(result, TargetAnalysis::AlreadyBinary));
    }

    #[test]
    fn test_analyze_string_label_needs_mapping() {
        let df = df! {
            "loan_status" => ["Default", "Paid", "Paid", "Default"],
        }
        .unwrap();

        match analyze_target_column(&df, "loan_status").unwrap() {
            TargetAnalysis::NeedsMapping { unique_values } => {
                assert_eq!(unique_values, vec!["Default".to_string(), "Paid".to_string()]);
            }
            _ => panic!("Expected NeedsMapping"),
        }
    }

    #[test]
    fn test_resolve_binary_labels() {
        let df = df! {
            "loan_status" => [Some(0.0f64), Some(1.0), None, Some(1.0)],
        }
        .unwrap();

        let labels = resolve_labels(&df, "loan_status", None).unwrap();
        assert_eq!(labels, vec![Some(0), Some(1), None, Some(1)]);
    }

    #[test]
    fn test_resolve_with_mapping() {
        let df = df! {
            "loan_status" => ["Default", "Paid", "Unknown", "Default"],
        }
        .unwrap();

        let mapping = TargetMapping::new("Default".to_string(), "Paid".to_string());
        let labels = resolve_labels(&df, "loan_status", Some(&mapping)).unwrap();
        assert_eq!(labels, vec![Some(1), Some(0), None, Some(1)]);
    }

    #[test]
    fn test_resolve_non_binary_without_mapping_errors() {
        let df = df! {
            "loan_status" => ["Default", "Paid"],
        }
        .unwrap();

        let err = resolve_labels(&df, "loan_status", None).unwrap_err();
        assert!(err.to_string().contains("--event-value"));
    }

    #[test]
    fn test_missing_label_column_errors() {
        let df = df! {
            "person_age" => [22.0f64, 35.0],
        }
        .unwrap();

        assert!(matches!(
            analyze_target_column(&df, "loan_status"),
            Err(PipelineError::DataLoad(_))
        ));
    }

    #[test]
    fn test_all_null_label_errors() {
        let df = df! {
            "loan_status" => [None::<i32>, None, None],
        }
        .unwrap();

        let err = analyze_target_column(&df, "loan_status").unwrap_err();
        assert!(err.to_string().contains("null"));
    }
}
