//! Regression tree inference
//!
//! Trees arrive fully grown inside the model artifact; this module only
//! walks them. A row descends left when the split feature is <= the
//! threshold, matching the convention of the offline trainer.

use crate::error::{PredictError, Result};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// A node of a fitted regression tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with prediction value
    Leaf { value: f64 },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// A single fitted regression tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeRegressor {
    root: TreeNode,
}

impl TreeRegressor {
    /// Wrap a fitted tree.
    pub fn new(root: TreeNode) -> Self {
        Self { root }
    }

    /// A degenerate single-leaf tree that always predicts `value`.
    pub fn constant(value: f64) -> Self {
        Self {
            root: TreeNode::Leaf { value },
        }
    }

    /// Predict the target for one feature row.
    pub fn predict_row(&self, row: &ArrayView1<f64>) -> Result<f64> {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { value } => return Ok(*value),
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                } => {
                    let v = row.get(*feature_idx).copied().ok_or_else(|| {
                        PredictError::Estimator(format!(
                            "tree references feature {} but row has {} columns",
                            feature_idx,
                            row.len()
                        ))
                    })?;
                    node = if v <= *threshold { left } else { right };
                }
            }
        }
    }

    /// Maximum feature index referenced anywhere in the tree.
    pub fn max_feature_idx(&self) -> Option<usize> {
        fn walk(node: &TreeNode) -> Option<usize> {
            match node {
                TreeNode::Leaf { .. } => None,
                TreeNode::Split {
                    feature_idx,
                    left,
                    right,
                    ..
                } => {
                    let mut max = Some(*feature_idx);
                    for child in [walk(left), walk(right)] {
                        if child > max {
                            max = child;
                        }
                    }
                    max
                }
            }
        }
        walk(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn stump() -> TreeRegressor {
        TreeRegressor::new(TreeNode::Split {
            feature_idx: 1,
            threshold: 5.0,
            left: Box::new(TreeNode::Leaf { value: 10.0 }),
            right: Box::new(TreeNode::Leaf { value: 20.0 }),
        })
    }

    #[test]
    fn test_traversal() {
        let tree = stump();
        let low = array![0.0, 4.0];
        let high = array![0.0, 6.0];
        assert_eq!(tree.predict_row(&low.view()).unwrap(), 10.0);
        assert_eq!(tree.predict_row(&high.view()).unwrap(), 20.0);
    }

    #[test]
    fn test_boundary_goes_left() {
        let tree = stump();
        let row = array![0.0, 5.0];
        assert_eq!(tree.predict_row(&row.view()).unwrap(), 10.0);
    }

    #[test]
    fn test_constant_tree() {
        let tree = TreeRegressor::constant(50.0);
        let row = array![1.0, 2.0, 3.0];
        assert_eq!(tree.predict_row(&row.view()).unwrap(), 50.0);
    }

    #[test]
    fn test_feature_out_of_bounds() {
        let tree = stump();
        let row = array![0.0];
        let err = tree.predict_row(&row.view()).unwrap_err();
        assert!(matches!(err, crate::error::PredictError::Estimator(_)));
    }

    #[test]
    fn test_max_feature_idx() {
        assert_eq!(stump().max_feature_idx(), Some(1));
        assert_eq!(TreeRegressor::constant(1.0).max_feature_idx(), None);
    }
}
