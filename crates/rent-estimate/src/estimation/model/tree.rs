use serde::Deserialize;

/// One regression tree in structure-of-arrays form. Node 0 is the root; a node whose
/// `left` and `right` are both `None` is a leaf.
///
/// Trees built with [`RegressionTree::new`] are structurally valid. Deserialized trees
/// are checked by the artifact loader; [`RegressionTree::predict`] answers NaN instead of
/// panicking if it meets one that was never validated.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegressionTree {
    split_feature: Vec<u32>,
    threshold: Vec<f64>,
    left: Vec<Option<u32>>,
    right: Vec<Option<u32>>,
    #[serde(default)]
    default_left: Vec<bool>,
    leaf_value: Vec<f64>,
}

/// Structural problems found while loading a tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeValidationError {
    #[error("tree has no nodes")]
    EmptyTree,
    #[error("node arrays disagree in length: {field} has {actual}, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("node {node} has only one child")]
    HalfSplit { node: u32 },
    #[error("node {node} points {side} to {child}, outside {n_nodes} nodes")]
    ChildOutOfBounds {
        node: u32,
        side: &'static str,
        child: u32,
        n_nodes: usize,
    },
    #[error("node {node} is reachable more than once")]
    DuplicateVisit { node: u32 },
    #[error("node {node} is unreachable from the root")]
    UnreachableNode { node: u32 },
    #[error("node {node} splits on feature {feature}, but only {n_features} are available")]
    FeatureOutOfRange {
        node: u32,
        feature: u32,
        n_features: usize,
    },
}

impl RegressionTree {
    /// Builds a tree from its node arrays, rejecting anything [`Self::validate`] would.
    /// Feature indices are checked later against a model's feature list.
    pub fn new(
        split_feature: Vec<u32>,
        threshold: Vec<f64>,
        left: Vec<Option<u32>>,
        right: Vec<Option<u32>>,
        default_left: Vec<bool>,
        leaf_value: Vec<f64>,
    ) -> Result<Self, TreeValidationError> {
        let tree = Self {
            split_feature,
            threshold,
            left,
            right,
            default_left,
            leaf_value,
        };
        tree.validate(usize::MAX)?;
        Ok(tree)
    }

    pub fn n_nodes(&self) -> usize {
        self.leaf_value.len()
    }

    fn goes_left(&self, node: usize, value: f64, threshold: f64) -> bool {
        if value.is_nan() {
            self.default_left.get(node).copied().unwrap_or(true)
        } else {
            value < threshold
        }
    }

    /// Walks from the root to a leaf. Features past the end of `features` read as NaN.
    /// Malformed nodes, or a walk longer than the tree, yield NaN.
    pub fn predict(&self, features: &[f64]) -> f64 {
        let mut node = 0usize;
        for _ in 0..=self.n_nodes() {
            let (Some(left), Some(right)) = (self.left.get(node), self.right.get(node)) else {
                return f64::NAN;
            };
            let next = match (left, right) {
                (None, None) => return self.leaf_value.get(node).copied().unwrap_or(f64::NAN),
                (Some(left), Some(right)) => {
                    let (Some(&feature), Some(&threshold)) =
                        (self.split_feature.get(node), self.threshold.get(node))
                    else {
                        return f64::NAN;
                    };
                    let value = features.get(feature as usize).copied().unwrap_or(f64::NAN);
                    if self.goes_left(node, value, threshold) {
                        *left
                    } else {
                        *right
                    }
                }
                _ => return f64::NAN,
            };
            node = next as usize;
        }
        f64::NAN
    }

    /// Checks array lengths, child bounds, reachability and acyclicity.
    pub fn validate(&self, n_features: usize) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }

        for (field, actual) in [
            ("split_feature", self.split_feature.len()),
            ("threshold", self.threshold.len()),
            ("left", self.left.len()),
            ("right", self.right.len()),
        ] {
            if actual != n_nodes {
                return Err(TreeValidationError::LengthMismatch {
                    field,
                    expected: n_nodes,
                    actual,
                });
            }
        }
        if !self.default_left.is_empty() && self.default_left.len() != n_nodes {
            return Err(TreeValidationError::LengthMismatch {
                field: "default_left",
                expected: n_nodes,
                actual: self.default_left.len(),
            });
        }

        let mut visited = vec![false; n_nodes];
        let mut stack = vec![0u32];
        while let Some(node) = stack.pop() {
            let index = node as usize;
            if visited[index] {
                return Err(TreeValidationError::DuplicateVisit { node });
            }
            visited[index] = true;

            match (self.left[index], self.right[index]) {
                (None, None) => {}
                (Some(left), Some(right)) => {
                    let feature = self.split_feature[index];
                    if feature as usize >= n_features {
                        return Err(TreeValidationError::FeatureOutOfRange {
                            node,
                            feature,
                            n_features,
                        });
                    }
                    for (side, child) in [("left", left), ("right", right)] {
                        if child as usize >= n_nodes {
                            return Err(TreeValidationError::ChildOutOfBounds {
                                node,
                                side,
                                child,
                                n_nodes,
                            });
                        }
                        stack.push(child);
                    }
                }
                _ => return Err(TreeValidationError::HalfSplit { node }),
            }
        }

        if let Some(unreached) = visited.iter().position(|seen| !seen) {
            return Err(TreeValidationError::UnreachableNode {
                node: unreached as u32,
            });
        }

        Ok(())
    }
}

/// Additive ensemble of regression trees (XGBoost/LightGBM style).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TreeEnsemble {
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<RegressionTree>,
}

impl TreeEnsemble {
    pub fn predict(&self, features: &[f64]) -> f64 {
        self.base_score
            + self
                .trees
                .iter()
                .map(|tree| tree.predict(features))
                .sum::<f64>()
    }

    pub fn validate(&self, n_features: usize) -> Result<(), (usize, TreeValidationError)> {
        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(index, tree)| tree.validate(n_features).map_err(|err| (index, err)))
    }
}
