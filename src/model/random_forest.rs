//! Random forest of Gini decision trees.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::RandomForestConfig;
use crate::error::{DocClassError, Result};
use crate::feature::FeatureVector;
use crate::model::classifier::{Classifier, ScoreKind, check_training_input};

const NAME: &str = "Random Forest";

/// Bagged ensemble of classification trees.
///
/// Every tree is grown on a bootstrap sample and considers `sqrt(n_features)`
/// randomly chosen features at each split. Trees are built in parallel; tree
/// `t` draws from its own generator seeded with `seed + t`, so the forest is
/// reproducible regardless of scheduling. The predicted distribution is the
/// mean of the leaf distributions reached in each tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    n_estimators: usize,
    max_depth: usize,
    min_samples_split: usize,
    seed: u64,
    n_classes: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn new(config: &RandomForestConfig, seed: u64) -> Self {
        Self {
            n_estimators: config.n_estimators,
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split.max(2),
            seed,
            n_classes: 0,
            trees: Vec::new(),
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for RandomForest {
    fn name(&self) -> &str {
        NAME
    }

    fn fit(&mut self, features: &[FeatureVector], labels: &[usize], n_classes: usize) -> Result<()> {
        let n_features = check_training_input(NAME, features, labels, n_classes)?;
        if self.n_estimators == 0 {
            return Err(DocClassError::training(NAME, "n_estimators must be positive"));
        }
        if n_features == 0 {
            return Err(DocClassError::training(NAME, "feature space is empty"));
        }

        let params = TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            max_features: ((n_features as f64).sqrt() as usize).max(1),
            n_classes,
        };
        let n_samples = features.len();
        let seed = self.seed;

        let trees: Vec<DecisionTree> = (0..self.n_estimators)
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
                let bootstrap: Vec<usize> = (0..n_samples)
                    .map(|_| rng.random_range(0..n_samples))
                    .collect();
                DecisionTree::fit(features, labels, &bootstrap, &params, &mut rng)
            })
            .collect();

        self.n_classes = n_classes;
        self.trees = trees;
        Ok(())
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    fn decision_scores(&self, x: &FeatureVector) -> Vec<f64> {
        let mut proba = vec![0.0; self.n_classes];
        if self.trees.is_empty() {
            return proba;
        }
        for tree in &self.trees {
            for (p, q) in proba.iter_mut().zip(tree.predict(x)) {
                *p += q;
            }
        }
        let n = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n);
        proba
    }

    fn score_kind(&self) -> ScoreKind {
        ScoreKind::Probability
    }
}

#[derive(Debug, Clone, Copy)]
struct TreeParams {
    max_depth: usize,
    min_samples_split: usize,
    max_features: usize,
    n_classes: usize,
}

/// Classification tree over sparse vectors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<Box<TreeNode>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        /// Class distribution of the training samples that reached the leaf.
        distribution: Vec<f64>,
    },
    Split {
        feature: usize,
        /// Samples with `x[feature] <= threshold` go left.
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// A candidate split: feature, threshold, weighted child impurity.
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl DecisionTree {
    fn fit(
        features: &[FeatureVector],
        labels: &[usize],
        indices: &[usize],
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let root = Self::build_tree(features, labels, indices, 0, params, rng);
        Self {
            root: Some(Box::new(root)),
        }
    }

    /// Class distribution at the leaf reached by `x`.
    pub fn predict(&self, x: &FeatureVector) -> Vec<f64> {
        match self.root {
            Some(ref root) => Self::predict_node(root, x).to_vec(),
            None => Vec::new(),
        }
    }

    /// Recursively grow the tree.
    ///
    /// Splitting stops at `max_depth`, when fewer than `min_samples_split`
    /// samples remain, when the node is pure, or when no split lowers the
    /// impurity.
    fn build_tree(
        features: &[FeatureVector],
        labels: &[usize],
        indices: &[usize],
        depth: usize,
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> TreeNode {
        let counts = class_counts(labels, indices, params.n_classes);
        let node_impurity = gini(&counts, indices.len());

        if depth >= params.max_depth
            || indices.len() < params.min_samples_split
            || node_impurity == 0.0
        {
            return Self::leaf(&counts, indices.len());
        }

        match Self::find_best_split(features, labels, indices, params, rng) {
            Some(split) if split.impurity < node_impurity => {
                let (left, right): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| features[i].get(split.feature) <= split.threshold);

                TreeNode::Split {
                    feature: split.feature,
                    threshold: split.threshold,
                    left: Box::new(Self::build_tree(features, labels, &left, depth + 1, params, rng)),
                    right: Box::new(Self::build_tree(features, labels, &right, depth + 1, params, rng)),
                }
            }
            _ => Self::leaf(&counts, indices.len()),
        }
    }

    fn leaf(counts: &[usize], total: usize) -> TreeNode {
        let total = total.max(1) as f64;
        TreeNode::Leaf {
            distribution: counts.iter().map(|&c| c as f64 / total).collect(),
        }
    }

    /// Find the best split among a random subset of non-constant features.
    ///
    /// Only features with a non-zero value somewhere in the node can split
    /// it, so candidates are drawn from that set until `max_features` of them
    /// have been evaluated.
    fn find_best_split(
        features: &[FeatureVector],
        labels: &[usize],
        indices: &[usize],
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Option<SplitCandidate> {
        let mut active: Vec<usize> = indices
            .iter()
            .flat_map(|&i| features[i].iter().map(|(idx, _)| idx))
            .collect();
        active.sort_unstable();
        active.dedup();
        active.shuffle(rng);

        let mut best: Option<SplitCandidate> = None;
        let mut evaluated = 0;

        for feature in active {
            if evaluated >= params.max_features {
                break;
            }

            let mut values: Vec<(f64, usize)> = indices
                .iter()
                .map(|&i| (features[i].get(feature), labels[i]))
                .collect();
            values.sort_by(|a, b| a.0.total_cmp(&b.0));

            if values.first().map(|v| v.0) == values.last().map(|v| v.0) {
                continue;
            }
            evaluated += 1;

            if let Some(candidate) = Self::best_threshold(feature, &values, params.n_classes) {
                if best.as_ref().is_none_or(|b| candidate.impurity < b.impurity) {
                    best = Some(candidate);
                }
            }
        }

        best
    }

    /// Sweep the sorted values of one feature, scoring every boundary
    /// between distinct values.
    fn best_threshold(feature: usize, values: &[(f64, usize)], n_classes: usize) -> Option<SplitCandidate> {
        let total = values.len();
        let mut right_counts = vec![0usize; n_classes];
        for &(_, label) in values {
            right_counts[label] += 1;
        }
        let mut left_counts = vec![0usize; n_classes];
        let mut best: Option<SplitCandidate> = None;

        for i in 1..total {
            let label = values[i - 1].1;
            left_counts[label] += 1;
            right_counts[label] -= 1;

            if values[i - 1].0 == values[i].0 {
                continue;
            }

            let impurity = Self::calculate_gain(&left_counts, i, &right_counts, total - i);
            if best.as_ref().is_none_or(|b| impurity < b.impurity) {
                best = Some(SplitCandidate {
                    feature,
                    threshold: (values[i - 1].0 + values[i].0) / 2.0,
                    impurity,
                });
            }
        }

        best
    }

    /// Weighted Gini impurity of the two children (lower is better).
    fn calculate_gain(left: &[usize], n_left: usize, right: &[usize], n_right: usize) -> f64 {
        let total = (n_left + n_right) as f64;
        (n_left as f64 / total) * gini(left, n_left) + (n_right as f64 / total) * gini(right, n_right)
    }

    fn predict_node<'a>(node: &'a TreeNode, x: &FeatureVector) -> &'a [f64] {
        match node {
            TreeNode::Leaf { distribution } => distribution,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if x.get(*feature) <= *threshold {
                    Self::predict_node(left, x)
                } else {
                    Self::predict_node(right, x)
                }
            }
        }
    }
}

fn class_counts(labels: &[usize], indices: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &i in indices {
        counts[labels[i]] += 1;
    }
    counts
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}
