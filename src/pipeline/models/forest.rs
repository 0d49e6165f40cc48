//! Random forest: bootstrap-bagged Gini trees with per-split feature sampling

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::tree::{grow_tree, BinnedFeatures, DecisionTree, SplitCriterion, TreeParams};
use super::{check_training_input, FitError};
use crate::pipeline::matrix::Matrix;

/// Histogram resolution for split search
const MAX_BINS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split; `None` means floor(sqrt(d))
    pub max_features: Option<usize>,
    pub bootstrap: bool,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 16,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit with tree `t` drawing its bootstrap and feature samples from `seed + t`.
    pub fn fit(x: &Matrix, labels: &[u8], params: &ForestParams, seed: u64) -> Result<Self, FitError> {
        check_training_input(x, labels)?;

        let n = x.n_rows();
        let d = x.n_cols();
        let max_features = params
            .max_features
            .unwrap_or_else(|| ((d as f64).sqrt().floor() as usize).max(1));

        let features = BinnedFeatures::new(x, MAX_BINS);
        let targets: Vec<f64> = labels.iter().map(|&l| l as f64).collect();
        let ones = vec![1.0; n];
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_leaf: params.min_samples_leaf,
            max_features: Some(max_features),
            criterion: SplitCriterion::Gini,
        };

        let trees: Vec<DecisionTree> = (0..params.n_trees.max(1))
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
                let rows: Vec<usize> = if params.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                grow_tree(&features, &targets, &ones, rows, &tree_params, &mut rng)
            })
            .collect();

        Ok(Self { trees })
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Average of the trees' leaf probabilities
    pub fn mean_probability(&self, x: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.trees.iter().map(|t| t.predict(x)).sum::<f64>() / self.trees.len() as f64
    }
}
