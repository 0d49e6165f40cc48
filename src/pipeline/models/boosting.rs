//! Gradient-boosted trees on log-loss with second-order (Newton) leaf steps

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::tree::{grow_tree, BinnedFeatures, DecisionTree, SplitCriterion, TreeParams};
use super::{check_training_input, sigmoid, FitError};
use crate::pipeline::matrix::Matrix;

const MAX_BINS: usize = 256;

/// Lower bound on per-row hessians so saturated rows keep a usable curvature
const MIN_HESSIAN: f64 = 1e-16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoostingParams {
    pub n_rounds: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub lambda: f64,
    pub min_child_hessian: f64,
    /// Initial probability; the starting margin is its log-odds
    pub base_score: f64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_rounds: 100,
            learning_rate: 0.3,
            max_depth: 6,
            lambda: 1.0,
            min_child_hessian: 1.0,
            base_score: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostedTrees {
    base_margin: f64,
    trees: Vec<DecisionTree>,
}

impl BoostedTrees {
    pub fn fit(x: &Matrix, labels: &[u8], params: &BoostingParams, seed: u64) -> Result<Self, FitError> {
        check_training_input(x, labels)?;
        if !(params.base_score > 0.0 && params.base_score < 1.0) {
            return Err(FitError::NonFinite("base margin"));
        }

        let n = x.n_rows();
        let base_margin = (params.base_score / (1.0 - params.base_score)).ln();
        let features = BinnedFeatures::new(x, MAX_BINS);
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_leaf: 1,
            max_features: None,
            criterion: SplitCriterion::SecondOrder {
                lambda: params.lambda,
                min_child_hessian: params.min_child_hessian,
            },
        };

        let mut rng = StdRng::seed_from_u64(seed);
        let mut margins = vec![base_margin; n];
        let mut grad = vec![0.0; n];
        let mut hess = vec![0.0; n];
        let mut trees = Vec::with_capacity(params.n_rounds);

        for _ in 0..params.n_rounds {
            for i in 0..n {
                let p = sigmoid(margins[i]);
                grad[i] = p - labels[i] as f64;
                hess[i] = (p * (1.0 - p)).max(MIN_HESSIAN);
            }

            let mut tree = grow_tree(&features, &grad, &hess, (0..n).collect(), &tree_params, &mut rng);
            tree.scale_leaves(params.learning_rate);

            for (i, row) in x.rows().enumerate() {
                margins[i] += tree.predict(row);
            }
            trees.push(tree);
        }

        if margins.iter().any(|m| !m.is_finite()) {
            return Err(FitError::NonFinite("margin"));
        }

        Ok(Self { base_margin, trees })
    }

    pub fn base_margin(&self) -> f64 {
        self.base_margin
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Log-odds: base margin plus every tree's leaf value
    pub fn margin(&self, x: &[f64]) -> f64 {
        self.base_margin + self.trees.iter().map(|t| t.predict(x)).sum::<f64>()
    }
}
