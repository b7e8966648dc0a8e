//! CART decision tree with Gini impurity and per-sample weights.
//!
//! The same builder serves the standalone tree model and the depth-limited
//! stumps boosted by [`crate::models::adaboost`].

use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::PipelineError;
use crate::models::classifier_trait::{Classifier, TrainedModel};
use crate::models::utils::{argmax, validate_prediction_input, validate_training_input, ClassEncoding};

/// Hyper-parameters of a single tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    /// `None` grows until leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Seeds the per-node feature permutation.
    pub seed: u64,
}

impl Default for TreeParams {
    fn default() -> Self {
        TreeParams {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 0,
        }
    }
}

impl TreeParams {
    fn validate(&self) -> Result<(), PipelineError> {
        if self.max_depth == Some(0) {
            return Err(PipelineError::InvalidParameter("max_depth must be at least 1".into()));
        }
        if self.min_samples_split < 2 {
            return Err(PipelineError::InvalidParameter(
                "min_samples_split must be at least 2".into(),
            ));
        }
        if self.min_samples_leaf < 1 {
            return Err(PipelineError::InvalidParameter(
                "min_samples_leaf must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Weighted class counts of the training samples reaching the leaf.
        value: Vec<f64>,
    },
}

/// A grown tree over dense class indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
    n_features: usize,
    n_classes: usize,
    importances: Array1<f64>,
}

struct Builder<'a> {
    x: &'a Array2<f64>,
    y: &'a [usize],
    weights: &'a [f64],
    n_classes: usize,
    params: TreeParams,
    rng: ChaCha8Rng,
    nodes: Vec<Node>,
    importances: Array1<f64>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    /// Weighted impurity of the two children, divided by node weight.
    child_impurity: f64,
}

fn gini(counts: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - counts.iter().map(|&c| (c / total) * (c / total)).sum::<f64>()
}

impl<'a> Builder<'a> {
    fn class_weights(&self, samples: &[usize]) -> Vec<f64> {
        let mut counts = vec![0.0; self.n_classes];
        for &i in samples {
            counts[self.y[i]] += self.weights[i];
        }
        counts
    }

    fn build(&mut self, samples: Vec<usize>, depth: usize) -> usize {
        let counts = self.class_weights(&samples);
        let total: f64 = counts.iter().sum();
        let impurity = gini(&counts, total);

        let n = samples.len();
        let depth_reached = self.params.max_depth.map_or(false, |d| depth >= d);
        let is_leaf = depth_reached
            || n < self.params.min_samples_split
            || n < 2 * self.params.min_samples_leaf
            || impurity <= f64::EPSILON;

        let split = if is_leaf {
            None
        } else {
            self.find_split(&samples, impurity)
        };

        let Some(split) = split else {
            self.nodes.push(Node::Leaf { value: counts });
            return self.nodes.len() - 1;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .partition(|&&i| self.x[(i, split.feature)] <= split.threshold);

        let decrease = total * (impurity - split.child_impurity);
        self.importances[split.feature] += decrease.max(0.0);

        // Reserve the slot so children get higher indices than the parent.
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { value: Vec::new() });
        let left_id = self.build(left, depth + 1);
        let right_id = self.build(right, depth + 1);
        self.nodes[id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: left_id,
            right: right_id,
        };
        id
    }

    /// Best split over all features, visiting them in a seeded random order.
    ///
    /// The first strictly best split wins, so the permutation decides
    /// between equally good candidates.
    fn find_split(&mut self, samples: &[usize], parent_impurity: f64) -> Option<BestSplit> {
        let n_features = self.x.ncols();
        let min_leaf = self.params.min_samples_leaf;
        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(&mut self.rng);

        let total_counts = self.class_weights(samples);
        let total: f64 = total_counts.iter().sum();

        let mut best: Option<BestSplit> = None;
        let mut order = samples.to_vec();

        for feature in features {
            order.sort_by(|&a, &b| self.x[(a, feature)].total_cmp(&self.x[(b, feature)]));

            let first = self.x[(order[0], feature)];
            let last = self.x[(order[order.len() - 1], feature)];
            if first == last {
                continue;
            }

            let mut left_counts = vec![0.0; self.n_classes];
            let mut left_total = 0.0;
            for pos in 0..order.len() - 1 {
                let i = order[pos];
                left_counts[self.y[i]] += self.weights[i];
                left_total += self.weights[i];

                let n_left = pos + 1;
                let n_right = order.len() - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let current = self.x[(i, feature)];
                let next = self.x[(order[pos + 1], feature)];
                if next <= current {
                    continue;
                }

                let right_total = total - left_total;
                let right_counts: Vec<f64> = total_counts
                    .iter()
                    .zip(&left_counts)
                    .map(|(t, l)| t - l)
                    .collect();
                let child_impurity = (left_total * gini(&left_counts, left_total)
                    + right_total * gini(&right_counts, right_total))
                    / total;

                if best.as_ref().map_or(true, |b| child_impurity < b.child_impurity) {
                    let mut threshold = (current + next) / 2.0;
                    if threshold >= next {
                        threshold = current;
                    }
                    best = Some(BestSplit {
                        feature,
                        threshold,
                        child_impurity,
                    });
                }
            }
        }

        // Splits that make the node worse are rejected; neutral splits are
        // kept so unconstrained trees can still separate interacting features.
        best.filter(|b| b.child_impurity <= parent_impurity + 1e-12)
    }
}

impl Tree {
    /// Grow a tree on encoded labels `y` (values in `0..n_classes`).
    pub fn grow(
        x: &Array2<f64>,
        y: &[usize],
        weights: &[f64],
        n_classes: usize,
        params: TreeParams,
    ) -> Result<Tree, PipelineError> {
        params.validate()?;
        if x.nrows() == 0 {
            return Err(PipelineError::EmptyDataset);
        }
        if y.len() != x.nrows() || weights.len() != x.nrows() {
            return Err(PipelineError::ShapeMismatch {
                expected: format!("{} labels and weights", x.nrows()),
                got: format!("{} labels, {} weights", y.len(), weights.len()),
            });
        }
        if weights.iter().any(|&w| !w.is_finite() || w < 0.0) {
            return Err(PipelineError::InvalidParameter(
                "sample weights must be finite and non-negative".into(),
            ));
        }

        let mut builder = Builder {
            x,
            y,
            weights,
            n_classes,
            params,
            rng: ChaCha8Rng::seed_from_u64(params.seed),
            nodes: Vec::new(),
            importances: Array1::zeros(x.ncols()),
        };
        builder.build((0..x.nrows()).collect(), 0);

        let mut importances = builder.importances;
        let sum = importances.sum();
        if sum > 0.0 {
            importances /= sum;
        }

        Ok(Tree {
            nodes: builder.nodes,
            n_features: x.ncols(),
            n_classes,
            importances,
        })
    }

    fn leaf_for(&self, row: ndarray::ArrayView1<f64>) -> &[f64] {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if row[*feature] <= *threshold { *left } else { *right };
                }
                Node::Leaf { value } => return value,
            }
        }
    }

    /// Predicted class index per row. `x` must have the training width.
    pub fn predict_encoded(&self, x: &Array2<f64>) -> Vec<usize> {
        x.rows().into_iter().map(|row| argmax(self.leaf_for(row))).collect()
    }

    /// Class probabilities per row: the weighted class shares of the leaf
    /// each row lands in. Shape: (n_rows, n_classes)
    pub fn predict_proba(&self, x: &Array2<f64>) -> Array2<f64> {
        let mut proba = Array2::<f64>::zeros((x.nrows(), self.n_classes));
        for (row, mut out) in x.rows().into_iter().zip(proba.rows_mut()) {
            let value = self.leaf_for(row);
            let total: f64 = value.iter().sum();
            if total > 0.0 {
                for (o, &v) in out.iter_mut().zip(value) {
                    *o = v / total;
                }
            } else {
                out.fill(1.0 / self.n_classes as f64);
            }
        }
        proba
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, Node::Leaf { .. })).count()
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: usize) -> usize {
            match &nodes[id] {
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
                Node::Leaf { .. } => 0,
            }
        }
        walk(&self.nodes, 0)
    }

    pub fn feature_importances(&self) -> &Array1<f64> {
        &self.importances
    }
}

/// Single decision tree classifier.
#[derive(Debug, Clone)]
pub struct DecisionTreeClassifier {
    params: TreeParams,
}

impl DecisionTreeClassifier {
    pub fn new(params: TreeParams) -> Self {
        DecisionTreeClassifier { params }
    }

    pub fn fit_tree(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<FittedDecisionTree, PipelineError> {
        validate_training_input(x, y)?;
        let encoding = ClassEncoding::fit(y);
        let encoded = encoding.encode(y)?;
        let weights = vec![1.0; x.nrows()];
        let tree = Tree::grow(x, &encoded, &weights, encoding.n_classes(), self.params)?;
        log::debug!(
            "Decision tree: {} nodes, {} leaves, depth {}",
            tree.node_count(),
            tree.leaf_count(),
            tree.depth()
        );
        Ok(FittedDecisionTree { tree, encoding })
    }
}

impl Classifier for DecisionTreeClassifier {
    fn fit(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<Box<dyn TrainedModel>, PipelineError> {
        Ok(Box::new(self.fit_tree(x, y)?))
    }

    fn name(&self) -> &str {
        "decision_tree"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FittedDecisionTree {
    tree: Tree,
    encoding: ClassEncoding,
}

impl FittedDecisionTree {
    pub fn tree(&self) -> &Tree {
        &self.tree
    }
}

impl TrainedModel for FittedDecisionTree {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<i64>, PipelineError> {
        validate_prediction_input(x, self.tree.n_features())?;
        Ok(self.encoding.decode(&self.tree.predict_encoded(x)))
    }

    fn n_features(&self) -> usize {
        self.tree.n_features()
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        Some(self.tree.feature_importances().clone())
    }

    fn name(&self) -> &str {
        "decision_tree"
    }
}
