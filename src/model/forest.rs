//! Random-forest regressor inference
//!
//! The forest predicts the mean of its member trees. Members are
//! individually queryable, which is what the confidence estimator uses
//! to approximate the spread of the ensemble.

use crate::error::{PredictError, Result};
use super::tree::TreeRegressor;
use ndarray::Array1;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A fitted random-forest regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestRegressor {
    trees: Vec<TreeRegressor>,
}

impl ForestRegressor {
    /// Wrap a fitted forest.
    pub fn new(trees: Vec<TreeRegressor>) -> Self {
        Self { trees }
    }

    /// Member trees of the ensemble.
    pub fn trees(&self) -> &[TreeRegressor] {
        &self.trees
    }

    /// Number of member trees.
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Predict the target for one feature row as the mean over all trees.
    pub fn predict_row(&self, row: &Array1<f64>) -> Result<f64> {
        if self.trees.is_empty() {
            return Err(PredictError::Estimator("forest has no trees".to_string()));
        }

        let predictions = self
            .trees
            .par_iter()
            .map(|tree| tree.predict_row(&row.view()))
            .collect::<Result<Vec<f64>>>()?;

        Ok(predictions.iter().sum::<f64>() / predictions.len() as f64)
    }
}
