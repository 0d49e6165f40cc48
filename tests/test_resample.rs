//! Tests for SMOTE oversampling of the training partition

use credrisk::pipeline::*;

fn imbalanced(majority: usize, minority: usize) -> (Matrix, Vec<u8>) {
    let mut rows = Vec::new();
    let mut labels = Vec::new();
    for i in 0..majority {
        rows.push(vec![(i % 10) as f64, (i / 10) as f64, 0.0]);
        labels.push(0);
    }
    for i in 0..minority {
        rows.push(vec![20.0 + i as f64, 5.0, 1.0]);
        labels.push(1);
    }
    (Matrix::from_rows(rows).unwrap(), labels)
}

#[test]
fn test_minority_upsampled_to_majority() {
    let (matrix, labels) = imbalanced(100, 10);

    let out = resample(&matrix, &labels, &SmoteConfig::default()).unwrap();
    let (non_default, default) = out.class_counts();

    assert_eq!(non_default, 100);
    assert!(
        (99..=101).contains(&default),
        "minority should reach parity, got {}",
        default
    );
    assert_eq!(out.synthetic_rows, default - 10);
    assert_eq!(out.matrix.n_rows(), out.labels.len());
}

#[test]
fn test_original_rows_are_preserved() {
    let (matrix, labels) = imbalanced(100, 10);
    let out = resample(&matrix, &labels, &SmoteConfig::default()).unwrap();

    for i in 0..matrix.n_rows() {
        assert_eq!(out.matrix.row(i), matrix.row(i));
        assert_eq!(out.labels[i], labels[i]);
    }
}

#[test]
fn test_synthetic_rows_stay_in_minority_hull() {
    let (matrix, labels) = imbalanced(100, 10);
    let out = resample(&matrix, &labels, &SmoteConfig::default()).unwrap();

    for i in matrix.n_rows()..out.matrix.n_rows() {
        let row = out.matrix.row(i);
        assert!((20.0..=29.0).contains(&row[0]));
        assert_eq!(row[1], 5.0);
        assert_eq!(row[2], 1.0);
        assert_eq!(out.labels[i], 1);
    }
}

#[test]
fn test_partial_target_ratio() {
    let (matrix, labels) = imbalanced(100, 10);
    let config = SmoteConfig {
        target_ratio: 0.5,
        ..SmoteConfig::default()
    };

    let out = resample(&matrix, &labels, &config).unwrap();
    assert_eq!(out.class_counts(), (100, 50));
}

#[test]
fn test_same_seed_same_rows() {
    let (matrix, labels) = imbalanced(60, 8);
    let config = SmoteConfig {
        seed: 7,
        ..SmoteConfig::default()
    };

    let first = resample(&matrix, &labels, &config).unwrap();
    let second = resample(&matrix, &labels, &config).unwrap();
    assert_eq!(first.matrix, second.matrix);

    let other = resample(&matrix, &labels, &SmoteConfig { seed: 8, ..config }).unwrap();
    assert_ne!(first.matrix, other.matrix);
}

#[test]
fn test_single_minority_row_is_insufficient() {
    let (matrix, labels) = imbalanced(20, 1);

    let result = resample(&matrix, &labels, &SmoteConfig::default());
    assert!(matches!(
        result,
        Err(PipelineError::InsufficientMinoritySamples { found: 1 })
    ));
}

#[test]
fn test_two_minority_rows_shrink_k() {
    let (matrix, labels) = imbalanced(20, 2);

    let out = resample(&matrix, &labels, &SmoteConfig::default()).unwrap();
    assert_eq!(out.class_counts(), (20, 20));
}
