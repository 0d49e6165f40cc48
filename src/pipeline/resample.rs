//! Synthetic minority oversampling (SMOTE)
//!
//! Runs on the transformed training partition only, after the transformer has
//! been fitted and the holdout split off, so no synthetic row ever leaks into
//! evaluation or serving data.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::error::{PipelineError, PipelineResult};
use super::matrix::Matrix;

/// Default number of nearest minority neighbors
pub const DEFAULT_K_NEIGHBORS: usize = 5;

/// Oversampling parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoteConfig {
    pub k_neighbors: usize,
    /// Desired minority/majority ratio after resampling, in (0, 1]
    pub target_ratio: f64,
    pub seed: u64,
}

impl Default for SmoteConfig {
    fn default() -> Self {
        Self {
            k_neighbors: DEFAULT_K_NEIGHBORS,
            target_ratio: 1.0,
            seed: 42,
        }
    }
}

/// Training matrix and labels after oversampling
#[derive(Debug, Clone)]
pub struct ResampledTrainingSet {
    pub matrix: Matrix,
    pub labels: Vec<u8>,
    /// Number of synthetic rows appended after the original rows
    pub synthetic_rows: usize,
}

impl ResampledTrainingSet {
    /// Wrap a matrix without resampling
    pub fn unchanged(matrix: Matrix, labels: Vec<u8>) -> Self {
        Self {
            matrix,
            labels,
            synthetic_rows: 0,
        }
    }

    /// Count of (non-default, default) labels
    pub fn class_counts(&self) -> (usize, usize) {
        let defaults = self.labels.iter().filter(|&&l| l == 1).count();
        (self.labels.len() - defaults, defaults)
    }
}

/// Oversample the minority class until it reaches `target_ratio × majority`.
///
/// Each synthetic row interpolates between a minority row and one of its k
/// nearest minority neighbors: `x + u * (neighbor - x)` with `u ~ U(0, 1)`.
/// Minority rows are visited round-robin so synthesis spreads evenly.
pub fn resample(matrix: &Matrix, labels: &[u8], config: &SmoteConfig) -> PipelineResult<ResampledTrainingSet> {
    if matrix.n_rows() != labels.len() {
        return Err(PipelineError::SchemaMismatch {
            expected: matrix.n_rows(),
            found: labels.len(),
        });
    }

    let positives: Vec<usize> = (0..labels.len()).filter(|&i| labels[i] == 1).collect();
    let negatives: Vec<usize> = (0..labels.len()).filter(|&i| labels[i] != 1).collect();

    let (minority, majority_count, minority_label) = if positives.len() <= negatives.len() {
        (positives, negatives.len(), 1u8)
    } else {
        (negatives, positives.len(), 0u8)
    };

    let target = (config.target_ratio.clamp(0.0, 1.0) * majority_count as f64).round() as usize;
    let n_synthetic = target.saturating_sub(minority.len());

    if n_synthetic == 0 {
        return Ok(ResampledTrainingSet::unchanged(matrix.clone(), labels.to_vec()));
    }

    // k shrinks to count - 1 when the minority class is tiny
    let k = config.k_neighbors.min(minority.len().saturating_sub(1));
    if k < 1 {
        return Err(PipelineError::InsufficientMinoritySamples {
            found: minority.len(),
        });
    }

    let minority_rows = matrix.select_rows(&minority);
    let neighbors = nearest_neighbors(&minority_rows, k);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut resampled = matrix.clone();
    let mut resampled_labels = labels.to_vec();
    let mut synthetic = vec![0.0; matrix.n_cols()];

    for s in 0..n_synthetic {
        let i = s % minority.len();
        let neighbor = neighbors[i][rng.gen_range(0..k)];
        let gap: f64 = rng.gen();

        let x = minority_rows.row(i);
        let nb = minority_rows.row(neighbor);
        for (out, (&a, &b)) in synthetic.iter_mut().zip(x.iter().zip(nb)) {
            *out = a + gap * (b - a);
        }

        resampled.push_row(&synthetic);
        resampled_labels.push(minority_label);
    }

    Ok(ResampledTrainingSet {
        matrix: resampled,
        labels: resampled_labels,
        synthetic_rows: n_synthetic,
    })
}

/// Indices of the k nearest other rows for every row (Euclidean distance).
///
/// Ties break on the lower row index so results are deterministic.
fn nearest_neighbors(rows: &Matrix, k: usize) -> Vec<Vec<usize>> {
    (0..rows.n_rows())
        .into_par_iter()
        .map(|i| {
            let origin = rows.row(i);
            let mut distances: Vec<(f64, usize)> = (0..rows.n_rows())
                .filter(|&j| j != i)
                .map(|j| (squared_distance(origin, rows.row(j)), j))
                .collect();
            distances.sort_by(|a, b| {
                a.0.partial_cmp(&b.0)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.1.cmp(&b.1))
            });
            distances.into_iter().take(k).map(|(_, j)| j).collect()
        })
        .collect()
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
