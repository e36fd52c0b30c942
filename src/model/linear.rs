//! Linear regressor inference

use crate::error::{PredictError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// A fitted linear regression model: w . x + b
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegressor {
    weights: Vec<f64>,
    intercept: f64,
}

impl LinearRegressor {
    /// Wrap fitted coefficients.
    pub fn new(weights: Vec<f64>, intercept: f64) -> Self {
        Self { weights, intercept }
    }

    /// Number of features the model was fitted on.
    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    /// Predict the target for one feature row.
    pub fn predict_row(&self, row: &Array1<f64>) -> Result<f64> {
        if row.len() != self.weights.len() {
            return Err(PredictError::Estimator(format!(
                "linear model fitted on {} features, row has {}",
                self.weights.len(),
                row.len()
            )));
        }

        let dot: f64 = self
            .weights
            .iter()
            .zip(row.iter())
            .map(|(w, x)| w * x)
            .sum();

        Ok(dot + self.intercept)
    }
}
