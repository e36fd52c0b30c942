//! Feed-forward regressor inference
//!
//! ReLU hidden layers, linear scalar output. This is the scale-sensitive
//! model type: the package loader keeps the bundled scaler only when the
//! artifact declares this model, so rows reaching `predict_row` are
//! already in scaled units.

use crate::error::{PredictError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// A fitted multi-layer perceptron regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpRegressor {
    weights: Vec<Array2<f64>>,
    biases: Vec<Array1<f64>>,
}

impl MlpRegressor {
    /// Wrap fitted layer parameters. Weight `i` maps layer `i` inputs to
    /// layer `i` outputs; bias lengths must match the output widths.
    pub fn new(weights: Vec<Array2<f64>>, biases: Vec<Array1<f64>>) -> Result<Self> {
        let net = Self { weights, biases };
        net.validate()?;
        Ok(net)
    }

    /// Shape checks shared by the constructor and the package loader.
    /// Deserialization bypasses `new`, so loading re-runs this before
    /// the network is allowed to predict.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.weights.is_empty() || self.weights.len() != self.biases.len() {
            return Err(PredictError::Estimator(format!(
                "malformed network: {} weight matrices, {} bias vectors",
                self.weights.len(),
                self.biases.len()
            )));
        }
        for (i, (w, b)) in self.weights.iter().zip(self.biases.iter()).enumerate() {
            if w.ncols() != b.len() {
                return Err(PredictError::Estimator(format!(
                    "layer {}: weight output width {} does not match bias length {}",
                    i,
                    w.ncols(),
                    b.len()
                )));
            }
        }
        Ok(())
    }

    /// Number of input features expected by the first layer.
    pub fn n_features(&self) -> usize {
        self.weights.first().map(|w| w.nrows()).unwrap_or(0)
    }

    /// Predict the target for one (already scaled) feature row.
    pub fn predict_row(&self, row: &Array1<f64>) -> Result<f64> {
        let mut activation = row.clone();
        let last = self.weights.len() - 1;

        for (i, (w, b)) in self.weights.iter().zip(self.biases.iter()).enumerate() {
            if activation.len() != w.nrows() {
                return Err(PredictError::Estimator(format!(
                    "layer {}: expected {} inputs, got {}",
                    i,
                    w.nrows(),
                    activation.len()
                )));
            }
            let mut out = activation.dot(w) + b;
            if i < last {
                out.mapv_inplace(|v| v.max(0.0));
            }
            activation = out;
        }

        if activation.len() != 1 {
            return Err(PredictError::Estimator(format!(
                "output layer produced {} values, expected 1",
                activation.len()
            )));
        }
        Ok(activation[0])
    }
}
