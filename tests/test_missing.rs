//! Unit tests for the missing value profile

use credrisk::pipeline::{analyze_missing_values, columns_with_missing, ApplicantRecord};

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_analyze_missing_values_basic() {
    let complete = common::typical_applicant();
    let partial = ApplicantRecord {
        interest_rate: None,
        loan_grade: None,
        ..common::typical_applicant()
    };
    let records = vec![complete.clone(), partial.clone(), complete, partial.clone(), partial];

    let ratios = analyze_missing_values(&records);
    let ratio_map: std::collections::HashMap<_, _> = ratios.into_iter().collect();

    // 3 of 5 records lack an interest rate and a grade
    assert!(
        (ratio_map["loan_int_rate"] - 0.6).abs() < 0.001,
        "loan_int_rate should have 60% missing, got {}",
        ratio_map["loan_int_rate"]
    );
    assert!((ratio_map["loan_grade"] - 0.6).abs() < 0.001);
    assert!(
        ratio_map["person_age"].abs() < 0.001,
        "person_age should have 0% missing, got {}",
        ratio_map["person_age"]
    );
}

#[test]
fn test_derived_ratio_missing_when_income_missing() {
    let records = vec![
        ApplicantRecord {
            income: None,
            ..common::typical_applicant()
        },
        common::typical_applicant(),
    ];

    let ratios = analyze_missing_values(&records);
    let ratio_map: std::collections::HashMap<_, _> = ratios.into_iter().collect();

    assert!((ratio_map["person_income"] - 0.5).abs() < 0.001);
    assert!((ratio_map["loan_percent_income"] - 0.5).abs() < 0.001);
}

#[test]
fn test_analyze_missing_values_sorted_descending() {
    let records = vec![
        ApplicantRecord::default(),
        ApplicantRecord {
            employment_length: None,
            ..common::typical_applicant()
        },
        common::typical_applicant(),
    ];

    let ratios = analyze_missing_values(&records);

    for i in 0..ratios.len() - 1 {
        assert!(
            ratios[i].1 >= ratios[i + 1].1,
            "Ratios should be sorted descending: {} >= {}",
            ratios[i].1,
            ratios[i + 1].1
        );
    }
    assert_eq!(ratios[0].0, "person_emp_length");
}

#[test]
fn test_columns_with_missing_filters_complete_columns() {
    let records = vec![
        ApplicantRecord {
            prior_default: None,
            ..common::typical_applicant()
        },
        common::typical_applicant(),
    ];

    let ratios = analyze_missing_values(&records);
    let missing = columns_with_missing(&ratios);

    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].0, "cb_person_default_on_file");
}

#[test]
fn test_empty_records_have_no_profile() {
    assert!(analyze_missing_values(&[]).is_empty());
}
