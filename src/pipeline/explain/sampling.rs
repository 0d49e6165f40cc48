//! Model-agnostic attributions by permutation sampling
//!
//! For each sampled feature ordering and each background row, features are
//! switched from the background value to the explained value one at a time
//! and the change in output is credited to the feature switched. Every
//! ordering telescopes from `f(background)` to `f(x)`, so contributions sum to
//! `f(x) - mean f(background)` exactly; the split between features is a
//! Monte-Carlo estimate.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::Explainer;
use crate::pipeline::matrix::Matrix;
use crate::pipeline::models::ClassifierModel;

/// Default number of sampled feature orderings
pub const DEFAULT_PERMUTATIONS: usize = 32;

pub struct SamplingExplainer<'a> {
    model: &'a ClassifierModel,
    background: &'a Matrix,
    n_permutations: usize,
    seed: u64,
}

impl<'a> SamplingExplainer<'a> {
    pub fn new(model: &'a ClassifierModel, background: &'a Matrix, seed: u64) -> Self {
        Self {
            model,
            background,
            n_permutations: DEFAULT_PERMUTATIONS,
            seed,
        }
    }

    pub fn with_permutations(mut self, n_permutations: usize) -> Self {
        self.n_permutations = n_permutations.max(1);
        self
    }

    /// Background rows; an all-zero row stands in when none were stored
    fn baseline_rows(&self, width: usize) -> Vec<Vec<f64>> {
        if self.background.is_empty() {
            vec![vec![0.0; width]]
        } else {
            self.background.rows().map(|r| r.to_vec()).collect()
        }
    }
}

impl Explainer for SamplingExplainer<'_> {
    fn base_value(&self) -> f64 {
        let rows = self.baseline_rows(self.background.n_cols());
        rows.iter().map(|r| self.model.raw_output(r)).sum::<f64>() / rows.len() as f64
    }

    fn contributions(&self, x: &[f64]) -> Vec<f64> {
        let d = x.len();
        let mut phi = vec![0.0; d];
        let baselines = self.baseline_rows(d);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut order: Vec<usize> = (0..d).collect();
        let mut z = vec![0.0; d];

        for _ in 0..self.n_permutations {
            order.shuffle(&mut rng);
            for baseline in &baselines {
                z.copy_from_slice(baseline);
                let mut previous = self.model.raw_output(&z);
                for &j in &order {
                    z[j] = x[j];
                    let current = self.model.raw_output(&z);
                    phi[j] += current - previous;
                    previous = current;
                }
            }
        }

        let samples = (self.n_permutations * baselines.len()) as f64;
        for p in &mut phi {
            *p /= samples;
        }
        phi
    }
}
