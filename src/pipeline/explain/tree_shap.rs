//! Exact path-dependent TreeSHAP over cover-annotated trees
//!
//! Follows Lundberg et al., "Consistent Individualized Feature Attribution for
//! Tree Ensembles" (Algorithm 2). The path tracks, for every distinct split
//! feature seen from the root, the fraction of "feature absent" mass that
//! flows down (zero fraction, via covers) and whether `x` follows the branch
//! (one fraction). Permutation weights are maintained incrementally.

use super::Explainer;
use crate::pipeline::models::{BoostedTrees, DecisionTree, RandomForest, TreeNode};

#[derive(Debug, Clone, Copy)]
struct PathElement {
    /// `None` for the root sentinel
    feature: Option<usize>,
    zero_fraction: f64,
    one_fraction: f64,
    pweight: f64,
}

/// Add SHAP values of one tree for `x` into `phi`.
pub(crate) fn tree_shap(tree: &DecisionTree, x: &[f64], phi: &mut [f64]) {
    let nodes = tree.nodes();
    if nodes.is_empty() {
        return;
    }
    recurse(nodes, x, phi, 0, Vec::with_capacity(32), 1.0, 1.0, None);
}

#[allow(clippy::too_many_arguments)]
fn recurse(
    nodes: &[TreeNode],
    x: &[f64],
    phi: &mut [f64],
    node: usize,
    mut path: Vec<PathElement>,
    zero_fraction: f64,
    one_fraction: f64,
    feature: Option<usize>,
) {
    extend_path(&mut path, zero_fraction, one_fraction, feature);
    let depth = path.len() - 1;

    match &nodes[node] {
        TreeNode::Leaf { value, .. } => {
            for i in 1..=depth {
                let w = unwound_path_sum(&path, i);
                let el = path[i];
                if let Some(f) = el.feature {
                    phi[f] += w * (el.one_fraction - el.zero_fraction) * value;
                }
            }
        }
        TreeNode::Split {
            feature: split_feature,
            threshold,
            left,
            right,
            cover,
        } => {
            let (hot, cold) = if x[*split_feature] <= *threshold {
                (*left, *right)
            } else {
                (*right, *left)
            };

            let mut incoming_zero = 1.0;
            let mut incoming_one = 1.0;

            // A feature already on the path is split again: undo its earlier
            // extension and carry its fractions forward.
            if let Some(k) = (1..=depth).find(|&k| path[k].feature == Some(*split_feature)) {
                incoming_zero = path[k].zero_fraction;
                incoming_one = path[k].one_fraction;
                unwind_path(&mut path, k);
            }

            let hot_ratio = nodes[hot].cover() / cover;
            let cold_ratio = nodes[cold].cover() / cover;

            recurse(
                nodes,
                x,
                phi,
                hot,
                path.clone(),
                hot_ratio * incoming_zero,
                incoming_one,
                Some(*split_feature),
            );
            recurse(
                nodes,
                x,
                phi,
                cold,
                path,
                cold_ratio * incoming_zero,
                0.0,
                Some(*split_feature),
            );
        }
    }
}

fn extend_path(path: &mut Vec<PathElement>, zero_fraction: f64, one_fraction: f64, feature: Option<usize>) {
    let depth = path.len();
    path.push(PathElement {
        feature,
        zero_fraction,
        one_fraction,
        pweight: if depth == 0 { 1.0 } else { 0.0 },
    });

    let denom = (depth + 1) as f64;
    for i in (0..depth).rev() {
        path[i + 1].pweight += one_fraction * path[i].pweight * (i + 1) as f64 / denom;
        path[i].pweight = zero_fraction * path[i].pweight * (depth - i) as f64 / denom;
    }
}

fn unwind_path(path: &mut Vec<PathElement>, index: usize) {
    let depth = path.len() - 1;
    let one_fraction = path[index].one_fraction;
    let zero_fraction = path[index].zero_fraction;
    let denom = (depth + 1) as f64;
    let mut next_one_portion = path[depth].pweight;

    for i in (0..depth).rev() {
        if one_fraction != 0.0 {
            let tmp = path[i].pweight;
            path[i].pweight = next_one_portion * denom / ((i + 1) as f64 * one_fraction);
            next_one_portion = tmp - path[i].pweight * zero_fraction * (depth - i) as f64 / denom;
        } else {
            path[i].pweight = path[i].pweight * denom / (zero_fraction * (depth - i) as f64);
        }
    }

    for i in index..depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
    path.pop();
}

/// Total permutation weight of the path with element `index` removed
fn unwound_path_sum(path: &[PathElement], index: usize) -> f64 {
    let depth = path.len() - 1;
    let one_fraction = path[index].one_fraction;
    let zero_fraction = path[index].zero_fraction;
    let denom = (depth + 1) as f64;
    let mut next_one_portion = path[depth].pweight;
    let mut total = 0.0;

    for i in (0..depth).rev() {
        if one_fraction != 0.0 {
            let tmp = next_one_portion * denom / ((i + 1) as f64 * one_fraction);
            total += tmp;
            next_one_portion = path[i].pweight - tmp * zero_fraction * (depth - i) as f64 / denom;
        } else if zero_fraction != 0.0 {
            total += (path[i].pweight / zero_fraction) / ((depth - i) as f64 / denom);
        }
    }

    total
}

/// Exact attributions for tree ensembles.
///
/// Output = `offset + scale × Σ tree(x)`: mean of trees for a forest
/// (offset 0, scale 1/T), base margin plus sum for boosting (scale 1).
pub struct TreeExplainer<'a> {
    trees: &'a [DecisionTree],
    offset: f64,
    scale: f64,
}

impl<'a> TreeExplainer<'a> {
    pub fn for_forest(forest: &'a RandomForest) -> Self {
        let n = forest.trees().len().max(1);
        Self {
            trees: forest.trees(),
            offset: 0.0,
            scale: 1.0 / n as f64,
        }
    }

    pub fn for_boosted(model: &'a BoostedTrees) -> Self {
        Self {
            trees: model.trees(),
            offset: model.base_margin(),
            scale: 1.0,
        }
    }
}

impl Explainer for TreeExplainer<'_> {
    fn base_value(&self) -> f64 {
        self.offset + self.scale * self.trees.iter().map(|t| t.expected_value()).sum::<f64>()
    }

    fn contributions(&self, x: &[f64]) -> Vec<f64> {
        let mut phi = vec![0.0; x.len()];
        for tree in self.trees {
            tree_shap(tree, x, &mut phi);
        }
        for p in &mut phi {
            *p *= self.scale;
        }
        phi
    }
}
