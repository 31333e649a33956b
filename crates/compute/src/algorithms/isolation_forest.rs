use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::pipeline::features::FeatureMatrix;

/// Upper bound on the rows each tree is grown from.
pub const MAX_SAMPLES: usize = 256;

const EULER_GAMMA: f64 = 0.577_215_664_9;

/// Average path length of an unsuccessful search in a binary search tree
/// of `n` nodes. Used to normalize path lengths and to account for the
/// unbuilt subtree below a leaf holding more than one row.
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        size: usize,
    },
}

/// One randomly split tree. Nodes live in an arena; index 0 is the root.
#[derive(Debug, Clone)]
pub struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn grow(data: &FeatureMatrix, rows: Vec<usize>, max_depth: usize, rng: &mut StdRng) -> Self {
        let mut tree = IsolationTree { nodes: Vec::new() };
        tree.build(data, rows, 0, max_depth, rng);
        tree
    }

    fn build(
        &mut self,
        data: &FeatureMatrix,
        rows: Vec<usize>,
        depth: usize,
        max_depth: usize,
        rng: &mut StdRng,
    ) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { size: rows.len() });
        if rows.len() <= 1 || depth >= max_depth {
            return id;
        }
        let Some((feature, threshold)) = pick_split(data, &rows, rng) else {
            return id;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&r| data.get(r, feature) <= threshold);
        let left = self.build(data, left_rows, depth + 1, max_depth, rng);
        let right = self.build(data, right_rows, depth + 1, max_depth, rng);
        self.nodes[id] = Node::Split { feature, threshold, left, right };
        id
    }

    /// Depth of the leaf `row` lands in, plus the expected depth of the
    /// subtree that leaf stands for.
    pub fn path_length(&self, data: &FeatureMatrix, row: usize) -> f64 {
        let mut node = 0;
        let mut depth = 0.0;
        loop {
            match &self.nodes[node] {
                Node::Split { feature, threshold, left, right } => {
                    node = if data.get(row, *feature) <= *threshold { *left } else { *right };
                    depth += 1.0;
                }
                Node::Leaf { size } => return depth + average_path_length(*size),
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Draw a feature that is not constant over `rows`, plus a threshold
/// uniform in `[min, max)` of that feature. `None` when every feature is
/// constant.
///
/// Columns with no stored entry in any of the rows are all-zero there and
/// can never split, so only columns stored for at least one row are drawn.
fn pick_split(data: &FeatureMatrix, rows: &[usize], rng: &mut StdRng) -> Option<(usize, f64)> {
    let mut candidates: Vec<usize> = rows
        .iter()
        .flat_map(|&r| data.row(r).0.iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    while !candidates.is_empty() {
        let pick = rng.gen_range(0..candidates.len());
        let feature = candidates.swap_remove(pick);
        let (min, max) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| {
            let v = data.get(r, feature);
            (lo.min(v), hi.max(v))
        });
        if max > min {
            return Some((feature, rng.gen_range(min..max)));
        }
    }
    None
}

/// Ensemble of isolation trees fit on one batch.
///
/// Scores follow the usual convention for this estimator: the negated
/// anomaly score `-2^(-E[h] / c(max_samples))`, so lower is more anomalous.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    max_samples: usize,
}

impl IsolationForest {
    /// Grow `n_estimators` trees on `data`. Tree seeds are drawn in order
    /// from `seed`, so the forest is reproducible regardless of how rayon
    /// schedules the work.
    pub fn fit(data: &FeatureMatrix, n_estimators: usize, seed: u64) -> Self {
        let n = data.n_rows();
        let max_samples = n.min(MAX_SAMPLES);
        let max_depth = (max_samples.max(2) as f64).log2().ceil() as usize;

        let mut master = StdRng::seed_from_u64(seed);
        let tree_seeds: Vec<u64> = (0..n_estimators).map(|_| master.gen()).collect();

        let trees = tree_seeds
            .into_par_iter()
            .map(|tree_seed| {
                let mut rng = StdRng::seed_from_u64(tree_seed);
                let sample = index::sample(&mut rng, n, max_samples).into_vec();
                IsolationTree::grow(data, sample, max_depth, &mut rng)
            })
            .collect();

        Self { trees, max_samples }
    }

    /// Score every row of `data`. Lower = more anomalous.
    pub fn score_samples(&self, data: &FeatureMatrix) -> Vec<f64> {
        let n = data.n_rows();
        if self.trees.is_empty() {
            return vec![0.0; n];
        }

        let normalizer = match average_path_length(self.max_samples) {
            c if c > 0.0 => c,
            _ => 1.0,
        };
        let n_trees = self.trees.len() as f64;
        // Per-row sums run in tree order; scratch space is one value per row.
        (0..n)
            .into_par_iter()
            .map(|row| {
                let total: f64 = self.trees.iter().map(|tree| tree.path_length(data, row)).sum();
                -(2f64.powf(-(total / n_trees) / normalizer))
            })
            .collect()
    }

    pub fn trees(&self) -> &[IsolationTree] {
        &self.trees
    }

    pub fn max_samples(&self) -> usize {
        self.max_samples
    }
}
