// src/model/tree.rs
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Growth limits for a single tree, derived from the forest parameters.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        positive_fraction: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A CART binary classification tree over an index arena of nodes.
///
/// Splits minimize Gini impurity over a random subset of features, which is
/// what decorrelates the trees of the ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Grow a tree on the given bootstrap `sample` (indices into `features`).
    ///
    /// Each split's weighted impurity decrease is accumulated into
    /// `importance`, indexed by feature.
    pub(crate) fn fit(
        features: &[Vec<f64>],
        labels: &[u8],
        sample: &[usize],
        params: TreeParams,
        rng: &mut StdRng,
        importance: &mut [f64],
    ) -> Self {
        let mut builder = TreeBuilder {
            features,
            labels,
            params,
            n_total: sample.len(),
            nodes: Vec::new(),
        };
        builder.build(sample.to_vec(), 0, rng, importance);
        Self {
            nodes: builder.nodes,
        }
    }

    /// Fraction of positive training samples in the leaf this row falls into.
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { positive_fraction } => return *positive_fraction,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

struct TreeBuilder<'a> {
    features: &'a [Vec<f64>],
    labels: &'a [u8],
    params: TreeParams,
    n_total: usize,
    nodes: Vec<Node>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl TreeBuilder<'_> {
    fn build(
        &mut self,
        sample: Vec<usize>,
        depth: usize,
        rng: &mut StdRng,
        importance: &mut [f64],
    ) -> usize {
        let n = sample.len();
        let positives = sample.iter().filter(|&&i| self.labels[i] == 1).count();
        let positive_fraction = positives as f64 / n as f64;

        let is_pure = positives == 0 || positives == n;
        if is_pure || depth >= self.params.max_depth || n < self.params.min_samples_split {
            return self.push_leaf(positive_fraction);
        }

        let best = match self.find_best_split(&sample, positives, rng) {
            Some(best) => best,
            None => return self.push_leaf(positive_fraction),
        };

        importance[best.feature] += (n as f64 / self.n_total as f64) * best.gain;

        let (left_sample, right_sample): (Vec<usize>, Vec<usize>) = sample
            .into_iter()
            .partition(|&i| self.features[i][best.feature] <= best.threshold);

        // Reserve the parent slot before recursing so child indices land after it.
        let node_index = self.push_leaf(positive_fraction);
        let left = self.build(left_sample, depth + 1, rng, importance);
        let right = self.build(right_sample, depth + 1, rng, importance);
        self.nodes[node_index] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        node_index
    }

    fn push_leaf(&mut self, positive_fraction: f64) -> usize {
        self.nodes.push(Node::Leaf { positive_fraction });
        self.nodes.len() - 1
    }

    /// Search a random feature subset for the threshold with the largest Gini
    /// gain, honoring `min_samples_leaf` on both children.
    fn find_best_split(
        &self,
        sample: &[usize],
        positives: usize,
        rng: &mut StdRng,
    ) -> Option<BestSplit> {
        let n = sample.len();
        let n_features = self.features[0].len();
        let parent_gini = gini(positives, n);

        let mut feature_pool: Vec<usize> = (0..n_features).collect();
        let (candidates, _) = feature_pool.partial_shuffle(rng, self.params.max_features);

        let mut best: Option<BestSplit> = None;
        let mut column: Vec<(f64, u8)> = Vec::with_capacity(n);

        for &feature in candidates.iter() {
            column.clear();
            column.extend(
                sample
                    .iter()
                    .map(|&i| (self.features[i][feature], self.labels[i])),
            );
            column.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            let mut left_n = 0usize;
            let mut left_pos = 0usize;
            for i in 0..n - 1 {
                left_n += 1;
                left_pos += column[i].1 as usize;

                // Only split between distinct values.
                if column[i].0 == column[i + 1].0 {
                    continue;
                }
                let right_n = n - left_n;
                if left_n < self.params.min_samples_leaf || right_n < self.params.min_samples_leaf
                {
                    continue;
                }

                let right_pos = positives - left_pos;
                let weighted = (left_n as f64 / n as f64) * gini(left_pos, left_n)
                    + (right_n as f64 / n as f64) * gini(right_pos, right_n);
                let gain = parent_gini - weighted;
                if gain <= 0.0 {
                    continue;
                }

                if best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(BestSplit {
                        feature,
                        threshold: (column[i].0 + column[i + 1].0) / 2.0,
                        gain,
                    });
                }
            }
        }
        best
    }
}

fn gini(positives: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = positives as f64 / n as f64;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}
