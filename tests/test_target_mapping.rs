//! Tests for resolving the loan_status column to binary labels

use credrisk::pipeline::*;
use polars::prelude::*;

/// Labels recorded as "Charged Off" / "Fully Paid" with an occasional unknown
fn create_string_label_dataframe() -> DataFrame {
    df! {
        "loan_status" => [
            Some("Charged Off"), Some("Fully Paid"), Some("Fully Paid"), None,
            Some("Current"), Some("Charged Off"), Some("Fully Paid"),
        ],
    }
    .unwrap()
}

#[test]
fn test_binary_numeric_labels_need_no_mapping() {
    let df = df! {
        "loan_status" => [0i64, 1, 1, 0],
    }
    .unwrap();

    assert!(matches!(
        analyze_target_column(&df, LABEL_COLUMN).unwrap(),
        TargetAnalysis::AlreadyBinary
    ));
    let labels = resolve_labels(&df, LABEL_COLUMN, None).unwrap();
    assert_eq!(labels, vec![Some(0), Some(1), Some(1), Some(0)]);
}

#[test]
fn test_float_labels_are_binary() {
    let df = df! {
        "loan_status" => [Some(1.0f64), Some(0.0), None],
    }
    .unwrap();

    let labels = resolve_labels(&df, LABEL_COLUMN, None).unwrap();
    assert_eq!(labels, vec![Some(1), Some(0), None]);
}

#[test]
fn test_string_labels_list_unique_values() {
    let df = create_string_label_dataframe();

    match analyze_target_column(&df, LABEL_COLUMN).unwrap() {
        TargetAnalysis::NeedsMapping { unique_values } => {
            assert_eq!(unique_values, vec!["Charged Off", "Current", "Fully Paid"]);
        }
        TargetAnalysis::AlreadyBinary => panic!("string labels should need a mapping"),
    }
}

#[test]
fn test_mapping_resolves_events_and_drops_the_rest() {
    let df = create_string_label_dataframe();
    let mapping = TargetMapping::new("Charged Off".to_string(), "Fully Paid".to_string());

    let labels = resolve_labels(&df, LABEL_COLUMN, Some(&mapping)).unwrap();
    assert_eq!(
        labels,
        vec![Some(1), Some(0), Some(0), None, None, Some(1), Some(0)]
    );
}

#[test]
fn test_numeric_multiclass_labels_can_be_mapped() {
    let df = df! {
        "loan_status" => [1i32, 2, 3, 2],
    }
    .unwrap();

    assert!(matches!(
        analyze_target_column(&df, LABEL_COLUMN).unwrap(),
        TargetAnalysis::NeedsMapping { .. }
    ));

    let mapping = TargetMapping::new("3".to_string(), "1".to_string());
    let labels = resolve_labels(&df, LABEL_COLUMN, Some(&mapping)).unwrap();
    assert_eq!(labels, vec![Some(0), None, Some(1), None]);
}

#[test]
fn test_all_null_labels_fail() {
    let df = df! {
        "loan_status" => [None::<i32>, None],
    }
    .unwrap();

    let result = analyze_target_column(&df, LABEL_COLUMN);
    assert!(matches!(result, Err(PipelineError::DataLoad(_))));
}

#[test]
fn test_absent_label_column_fails() {
    let df = df! {
        "person_age" => [30.0f64],
    }
    .unwrap();

    let err = resolve_labels(&df, LABEL_COLUMN, None).unwrap_err();
    assert!(err.to_string().contains("loan_status"));
}
