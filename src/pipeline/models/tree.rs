//! Binary decision trees shared by the bagged and boosted ensembles
//!
//! Trees are grown on histogram-binned features: every column is cut into at
//! most `max_bins` buckets once, and split search accumulates per-bucket
//! statistics instead of re-sorting rows at every node. Each node records its
//! cover (number of training rows that reached it), which the exact tree
//! explainer relies on.

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::pipeline::matrix::Matrix;

/// Minimum improvement required to accept a split
const MIN_SPLIT_GAIN: f64 = 1e-12;

/// A tree node. Rows with `x[feature] <= threshold` go left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        value: f64,
        cover: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        cover: f64,
    },
}

impl TreeNode {
    pub fn cover(&self) -> f64 {
        match self {
            TreeNode::Leaf { cover, .. } | TreeNode::Split { cover, .. } => *cover,
        }
    }
}

/// Flat array tree; node 0 is the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn predict(&self, x: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Cover-weighted mean leaf value: the tree's expected output over its
    /// training rows.
    pub fn expected_value(&self) -> f64 {
        let root_cover = self.nodes[0].cover();
        if root_cover <= 0.0 {
            return 0.0;
        }
        self.nodes
            .iter()
            .filter_map(|n| match n {
                TreeNode::Leaf { value, cover } => Some(value * cover / root_cover),
                TreeNode::Split { .. } => None,
            })
            .sum()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], idx: usize) -> usize {
            match &nodes[idx] {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        walk(&self.nodes, 0)
    }

    pub(crate) fn scale_leaves(&mut self, factor: f64) {
        for node in &mut self.nodes {
            if let TreeNode::Leaf { value, .. } = node {
                *value *= factor;
            }
        }
    }
}

/// Training matrix quantized into per-column buckets
pub(crate) struct BinnedFeatures {
    n_cols: usize,
    bins: Vec<u16>,
    /// Ascending cut points per column; bucket `b` holds values in `(cuts[b-1], cuts[b]]`
    cuts: Vec<Vec<f64>>,
}

impl BinnedFeatures {
    pub(crate) fn new(x: &Matrix, max_bins: usize) -> Self {
        let n_rows = x.n_rows();
        let n_cols = x.n_cols();
        let max_bins = max_bins.clamp(2, u16::MAX as usize);

        let cuts: Vec<Vec<f64>> = (0..n_cols)
            .map(|j| {
                let mut column: Vec<f64> = (0..n_rows).map(|i| x.get(i, j)).collect();
                column.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                column_cuts(&column, max_bins)
            })
            .collect();

        let mut bins = Vec::with_capacity(n_rows * n_cols);
        for i in 0..n_rows {
            for (j, column_cuts) in cuts.iter().enumerate() {
                let v = x.get(i, j);
                bins.push(column_cuts.partition_point(|&c| c < v) as u16);
            }
        }

        Self { n_cols, bins, cuts }
    }

    fn bin(&self, row: usize, col: usize) -> usize {
        self.bins[row * self.n_cols + col] as usize
    }

    pub(crate) fn n_cols(&self) -> usize {
        self.n_cols
    }
}

/// Cut points for one sorted column: midpoints between distinct values when
/// few, otherwise distinct quantile values.
fn column_cuts(sorted: &[f64], max_bins: usize) -> Vec<f64> {
    let mut distinct: Vec<f64> = sorted.to_vec();
    distinct.dedup();

    if distinct.len() <= max_bins {
        return distinct
            .windows(2)
            .map(|w| {
                let mid = w[0] + (w[1] - w[0]) / 2.0;
                // Adjacent floats can round the midpoint up to the right value
                if mid >= w[1] {
                    w[0]
                } else {
                    mid
                }
            })
            .collect();
    }

    let n = sorted.len();
    let mut cuts: Vec<f64> = (1..max_bins).map(|q| sorted[q * n / max_bins]).collect();
    cuts.dedup();
    // The largest value never needs a cut above it
    if cuts.last() == distinct.last() {
        cuts.pop();
    }
    cuts
}

/// Accumulated first/second order statistics at a node
#[derive(Debug, Clone, Copy, Default)]
struct NodeStats {
    grad: f64,
    hess: f64,
    count: f64,
}

impl NodeStats {
    fn add(&mut self, g: f64, h: f64) {
        self.grad += g;
        self.hess += h;
        self.count += 1.0;
    }

    fn minus(&self, other: &NodeStats) -> NodeStats {
        NodeStats {
            grad: self.grad - other.grad,
            hess: self.hess - other.hess,
            count: self.count - other.count,
        }
    }
}

/// How candidate splits are scored and leaves valued
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum SplitCriterion {
    /// Gini impurity on 0/1 labels passed as gradients with unit hessians.
    /// Leaves hold the positive fraction.
    Gini,
    /// Second-order gain on log-loss gradients. Leaves hold the Newton step.
    SecondOrder { lambda: f64, min_child_hessian: f64 },
}

impl SplitCriterion {
    /// Node score; split gain = score(left) + score(right) - score(parent)
    fn score(&self, s: &NodeStats) -> f64 {
        match self {
            SplitCriterion::Gini => {
                if s.hess <= 0.0 {
                    0.0
                } else {
                    // Negative weighted impurity: -n * 2p(1-p)
                    -2.0 * s.grad * (s.hess - s.grad) / s.hess
                }
            }
            SplitCriterion::SecondOrder { lambda, .. } => s.grad * s.grad / (s.hess + lambda),
        }
    }

    fn leaf_value(&self, s: &NodeStats) -> f64 {
        match self {
            SplitCriterion::Gini => {
                if s.hess > 0.0 {
                    s.grad / s.hess
                } else {
                    0.0
                }
            }
            SplitCriterion::SecondOrder { lambda, .. } => -s.grad / (s.hess + lambda),
        }
    }

    fn admissible(&self, left: &NodeStats, right: &NodeStats, min_samples_leaf: f64) -> bool {
        if left.count < min_samples_leaf || right.count < min_samples_leaf {
            return false;
        }
        match self {
            SplitCriterion::Gini => true,
            SplitCriterion::SecondOrder {
                min_child_hessian, ..
            } => left.hess >= *min_child_hessian && right.hess >= *min_child_hessian,
        }
    }

    fn is_pure(&self, s: &NodeStats) -> bool {
        match self {
            SplitCriterion::Gini => s.grad <= 0.0 || s.grad >= s.hess,
            SplitCriterion::SecondOrder { .. } => false,
        }
    }
}

/// Growth limits for one tree
#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeParams {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Features sampled per split; `None` considers all
    pub max_features: Option<usize>,
    pub criterion: SplitCriterion,
}

struct TreeGrower<'a> {
    features: &'a BinnedFeatures,
    grad: &'a [f64],
    hess: &'a [f64],
    params: &'a TreeParams,
    nodes: Vec<TreeNode>,
}

struct BestSplit {
    feature: usize,
    bin: usize,
    gain: f64,
}

/// Grow a tree on the given training rows (duplicates allowed, as in a bootstrap).
pub(crate) fn grow_tree(
    features: &BinnedFeatures,
    grad: &[f64],
    hess: &[f64],
    rows: Vec<usize>,
    params: &TreeParams,
    rng: &mut StdRng,
) -> DecisionTree {
    let mut grower = TreeGrower {
        features,
        grad,
        hess,
        params,
        nodes: Vec::new(),
    };
    grower.grow(rows, 0, rng);
    DecisionTree {
        nodes: grower.nodes,
    }
}

impl TreeGrower<'_> {
    fn grow(&mut self, rows: Vec<usize>, depth: usize, rng: &mut StdRng) -> usize {
        let mut stats = NodeStats::default();
        for &r in &rows {
            stats.add(self.grad[r], self.hess[r]);
        }

        let id = self.nodes.len();
        self.nodes.push(TreeNode::Leaf {
            value: self.params.criterion.leaf_value(&stats),
            cover: stats.count,
        });

        let min_leaf = self.params.min_samples_leaf.max(1);
        if depth >= self.params.max_depth
            || rows.len() < 2 * min_leaf
            || self.params.criterion.is_pure(&stats)
        {
            return id;
        }

        let Some(best) = self.find_split(&rows, &stats, rng) else {
            return id;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&r| self.features.bin(r, best.feature) <= best.bin);

        let threshold = self.features.cuts[best.feature][best.bin];
        let left = self.grow(left_rows, depth + 1, rng);
        let right = self.grow(right_rows, depth + 1, rng);

        self.nodes[id] = TreeNode::Split {
            feature: best.feature,
            threshold,
            left,
            right,
            cover: stats.count,
        };
        id
    }

    fn candidate_features(&self, rng: &mut StdRng) -> Vec<usize> {
        let n = self.features.n_cols();
        match self.params.max_features {
            Some(m) if m < n => {
                let mut picked = rand::seq::index::sample(rng, n, m.max(1)).into_vec();
                picked.sort_unstable();
                picked
            }
            _ => (0..n).collect(),
        }
    }

    fn find_split(&self, rows: &[usize], parent: &NodeStats, rng: &mut StdRng) -> Option<BestSplit> {
        let criterion = &self.params.criterion;
        let parent_score = criterion.score(parent);
        let min_leaf = self.params.min_samples_leaf.max(1) as f64;
        let mut best: Option<BestSplit> = None;

        for feature in self.candidate_features(rng) {
            let n_cuts = self.features.cuts[feature].len();
            if n_cuts == 0 {
                continue;
            }

            let mut histogram = vec![NodeStats::default(); n_cuts + 1];
            for &r in rows {
                histogram[self.features.bin(r, feature)].add(self.grad[r], self.hess[r]);
            }

            let mut left = NodeStats::default();
            for (bin, bucket) in histogram.iter().take(n_cuts).enumerate() {
                left.grad += bucket.grad;
                left.hess += bucket.hess;
                left.count += bucket.count;
                if bucket.count == 0.0 {
                    continue;
                }

                let right = parent.minus(&left);
                if !criterion.admissible(&left, &right, min_leaf) {
                    continue;
                }

                let gain = criterion.score(&left) + criterion.score(&right) - parent_score;
                if gain > MIN_SPLIT_GAIN && best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(BestSplit { feature, bin, gain });
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn gini_params(max_depth: usize) -> TreeParams {
        TreeParams {
            max_depth,
            min_samples_leaf: 1,
            max_features: None,
            criterion: SplitCriterion::Gini,
        }
    }

    #[test]
    fn test_column_cuts_midpoints() {
        assert_eq!(column_cuts(&[0.0, 0.0, 1.0, 1.0], 256), vec![0.5]);
        assert!(column_cuts(&[3.0, 3.0], 256).is_empty());
    }

    #[test]
    fn test_column_cuts_quantiles_when_many_values() {
        let sorted: Vec<f64> = (0..1000).map(|i| i as f64).collect();
        let cuts = column_cuts(&sorted, 10);
        assert_eq!(cuts.len(), 9);
        assert!(cuts.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_gini_tree_separates_classes() {
        let x = Matrix::from_rows((0..8).map(|i| vec![i as f64]).collect()).unwrap();
        let y: Vec<f64> = (0..8).map(|i| if i >= 4 { 1.0 } else { 0.0 }).collect();
        let ones = vec![1.0; 8];
        let features = BinnedFeatures::new(&x, 256);
        let mut rng = StdRng::seed_from_u64(0);

        let tree = grow_tree(&features, &y, &ones, (0..8).collect(), &gini_params(4), &mut rng);
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict(&[1.0]), 0.0);
        assert_eq!(tree.predict(&[6.0]), 1.0);
        assert!((tree.expected_value() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_covers_sum_to_parent() {
        let x = Matrix::from_rows((0..20).map(|i| vec![(i % 7) as f64, (i % 3) as f64]).collect()).unwrap();
        let y: Vec<f64> = (0..20).map(|i| ((i % 7) > 3) as u8 as f64).collect();
        let ones = vec![1.0; 20];
        let features = BinnedFeatures::new(&x, 256);
        let mut rng = StdRng::seed_from_u64(1);
        let tree = grow_tree(&features, &y, &ones, (0..20).collect(), &gini_params(5), &mut rng);

        for node in tree.nodes() {
            if let TreeNode::Split { left, right, cover, .. } = node {
                let sum = tree.nodes()[*left].cover() + tree.nodes()[*right].cover();
                assert_eq!(sum, *cover);
            }
        }
    }

    #[test]
    fn test_max_depth_zero_is_single_leaf() {
        let x = Matrix::from_rows(vec![vec![0.0], vec![1.0]]).unwrap();
        let features = BinnedFeatures::new(&x, 256);
        let mut rng = StdRng::seed_from_u64(0);
        let tree = grow_tree(&features, &[0.0, 1.0], &[1.0, 1.0], vec![0, 1], &gini_params(0), &mut rng);
        assert_eq!(tree.nodes().len(), 1);
        assert_eq!(tree.predict(&[5.0]), 0.5);
    }

    #[test]
    fn test_second_order_leaf_is_newton_step() {
        let x = Matrix::from_rows(vec![vec![0.0], vec![1.0]]).unwrap();
        let features = BinnedFeatures::new(&x, 256);
        let mut rng = StdRng::seed_from_u64(0);
        let params = TreeParams {
            max_depth: 0,
            min_samples_leaf: 1,
            max_features: None,
            criterion: SplitCriterion::SecondOrder {
                lambda: 1.0,
                min_child_hessian: 0.0,
            },
        };
        let tree = grow_tree(&features, &[0.5, -0.5], &[0.25, 0.25], vec![0, 1], &params, &mut rng);
        // -G / (H + lambda) = 0 / 1.5
        assert_eq!(tree.predict(&[0.0]), 0.0);
    }
}
