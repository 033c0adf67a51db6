//! Gradient-boosted regression trees, squared-error loss.
//!
//! Sized for the handful of rows a recent-form dataset has: exhaustive split
//! search over midpoints of every feature, no subsampling.

use ndarray::{ArrayView1, ArrayView2};

#[derive(Debug, Clone, Copy)]
pub struct BoostParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_split: usize,
}

impl Default for BoostParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_split: 2,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, row: ArrayView1<f64>) -> f64 {
        match self {
            Node::Leaf(v) => *v,
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row[*feature] <= *threshold {
                    left.predict(row)
                } else {
                    right.predict(row)
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct BoostedTrees {
    base: f64,
    learning_rate: f64,
    trees: Vec<Node>,
}

impl BoostedTrees {
    /// `None` when there are no rows or the shapes disagree.
    pub fn fit(x: ArrayView2<f64>, y: ArrayView1<f64>, params: BoostParams) -> Option<Self> {
        let n = x.nrows();
        if n == 0 || y.len() != n {
            return None;
        }
        let base = y.sum() / n as f64;
        let mut current = vec![base; n];
        let mut trees = Vec::with_capacity(params.n_estimators);
        let all: Vec<usize> = (0..n).collect();

        for _ in 0..params.n_estimators {
            let residuals: Vec<f64> = (0..n).map(|i| y[i] - current[i]).collect();
            if residuals.iter().all(|r| r.abs() < 1e-12) {
                break;
            }
            let tree = build(x, &residuals, &all, 0, params);
            for (i, c) in current.iter_mut().enumerate() {
                *c += params.learning_rate * tree.predict(x.row(i));
            }
            trees.push(tree);
        }

        Some(Self {
            base,
            learning_rate: params.learning_rate,
            trees,
        })
    }

    pub fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        self.base
            + self.learning_rate * self.trees.iter().map(|t| t.predict(row)).sum::<f64>()
    }

    pub fn stages(&self) -> usize {
        self.trees.len()
    }
}

fn build(x: ArrayView2<f64>, target: &[f64], idx: &[usize], depth: usize, params: BoostParams) -> Node {
    let leaf = Node::Leaf(mean(target, idx));
    if depth >= params.max_depth || idx.len() < params.min_samples_split.max(2) {
        return leaf;
    }
    let Some((feature, threshold)) = best_split(x, target, idx) else {
        return leaf;
    };
    let (left, right): (Vec<usize>, Vec<usize>) =
        idx.iter().partition(|&&i| x[(i, feature)] <= threshold);
    Node::Split {
        feature,
        threshold,
        left: Box::new(build(x, target, &left, depth + 1, params)),
        right: Box::new(build(x, target, &right, depth + 1, params)),
    }
}

/// Split with the lowest summed squared error, if any beats no split at all.
fn best_split(x: ArrayView2<f64>, target: &[f64], idx: &[usize]) -> Option<(usize, f64)> {
    let parent = sse(target, idx);
    let mut best: Option<(usize, f64, f64)> = None;

    for feature in 0..x.ncols() {
        let mut values: Vec<f64> = idx.iter().map(|&i| x[(i, feature)]).collect();
        values.sort_by(|a, b| a.total_cmp(b));
        values.dedup();
        for pair in values.windows(2) {
            let threshold = (pair[0] + pair[1]) / 2.0;
            let (left, right): (Vec<usize>, Vec<usize>) =
                idx.iter().partition(|&&i| x[(i, feature)] <= threshold);
            let cost = sse(target, &left) + sse(target, &right);
            if cost + 1e-12 < parent && best.is_none_or(|(_, _, c)| cost < c) {
                best = Some((feature, threshold, cost));
            }
        }
    }
    best.map(|(f, t, _)| (f, t))
}

fn mean(target: &[f64], idx: &[usize]) -> f64 {
    if idx.is_empty() {
        return 0.0;
    }
    idx.iter().map(|&i| target[i]).sum::<f64>() / idx.len() as f64
}

fn sse(target: &[f64], idx: &[usize]) -> f64 {
    let m = mean(target, idx);
    idx.iter().map(|&i| (target[i] - m).powi(2)).sum()
}
