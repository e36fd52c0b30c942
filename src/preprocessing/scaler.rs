//! Standard-scaling transform for assembled feature rows
//!
//! The scaler is fitted offline; only its per-column means and standard
//! deviations travel in the artifact. The transform is applied to a row
//! that is already in the fixed training column order, so parameters are
//! positional rather than keyed by column name.

use crate::error::{PredictError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Fitted standard scaler: (x - mean) / std per column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    /// Create a scaler from fitted parameters. Lengths must match.
    pub fn new(means: Vec<f64>, stds: Vec<f64>) -> Result<Self> {
        if means.len() != stds.len() {
            return Err(PredictError::Scaling(format!(
                "parameter length mismatch: {} means vs {} stds",
                means.len(),
                stds.len()
            )));
        }
        Ok(Self { means, stds })
    }

    /// Number of columns the scaler was fitted on.
    pub fn n_columns(&self) -> usize {
        self.means.len()
    }

    /// Scale an assembled feature row.
    ///
    /// A zero standard deviation is treated as 1.0 so constant columns
    /// pass through centered instead of producing infinities.
    pub fn transform_row(&self, row: &Array1<f64>) -> Result<Array1<f64>> {
        if row.len() != self.means.len() {
            return Err(PredictError::Scaling(format!(
                "row width mismatch: scaler fitted on {} columns, row has {}",
                self.means.len(),
                row.len()
            )));
        }

        let scaled: Vec<f64> = row
            .iter()
            .zip(self.means.iter().zip(self.stds.iter()))
            .map(|(&v, (&mean, &std))| {
                let scale = if std == 0.0 { 1.0 } else { std };
                (v - mean) / scale
            })
            .collect();

        Ok(Array1::from_vec(scaled))
    }

    /// Invert the transform, mapping a scaled row back to raw units.
    pub fn inverse_transform_row(&self, row: &Array1<f64>) -> Result<Array1<f64>> {
        if row.len() != self.means.len() {
            return Err(PredictError::Scaling(format!(
                "row width mismatch: scaler fitted on {} columns, row has {}",
                self.means.len(),
                row.len()
            )));
        }

        let raw: Vec<f64> = row
            .iter()
            .zip(self.means.iter().zip(self.stds.iter()))
            .map(|(&v, (&mean, &std))| {
                let scale = if std == 0.0 { 1.0 } else { std };
                v * scale + mean
            })
            .collect();

        Ok(Array1::from_vec(raw))
    }
}
